//! Replaying adapters that replay recorded interactions.

pub mod llm;

pub use llm::ReplayingLlmClient;

/// Extracts a `Result` from a cassette output value.
///
/// Mirror of `recording::record_result`: expects `{"ok": <value>}` or
/// `{"err": "message"}`.
pub(crate) fn replay_result<T: serde::de::DeserializeOwned>(
    output: &serde_json::Value,
    context: &str,
) -> Result<T, Box<dyn std::error::Error + Send + Sync>> {
    if let Some(err) = output.get("err") {
        let msg = err.as_str().unwrap_or("unknown error").to_string();
        return Err(msg.into());
    }
    let value = output.get("ok").unwrap_or(output);
    serde_json::from_value(value.clone())
        .map_err(|e| format!("{context}: failed to deserialize: {e}").into())
}
