//! Live adapters for real external interactions.

pub mod anthropic;
pub mod clock;
pub mod filesystem;
pub mod gemini;

use std::time::Duration;

use crate::config::Provider;
use crate::error::ConfigError;
use crate::ports::LlmClient;

/// Builds the live client for `provider`.
///
/// # Errors
///
/// Returns [`ConfigError::HttpClient`] if the HTTP client cannot be built.
pub fn llm_client(
    provider: Provider,
    api_key: String,
    timeout: Duration,
) -> Result<Box<dyn LlmClient>, ConfigError> {
    Ok(match provider {
        Provider::Gemini => Box::new(gemini::GeminiClient::new(api_key, timeout)?),
        Provider::Anthropic => Box::new(anthropic::AnthropicClient::new(api_key, timeout)?),
    })
}
