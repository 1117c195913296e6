//! Replaying adapter for the `LlmClient` port.

use std::sync::Mutex;

use super::replay_result;
use crate::cassette::replayer::CassetteReplayer;
use crate::ports::{CompletionRequest, CompletionResponse, LlmClient, LlmFuture};

/// Serves recorded LLM completions from a cassette, in recording order.
pub struct ReplayingLlmClient {
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingLlmClient {
    /// Create a replaying LLM client backed by the given replayer.
    #[must_use]
    pub fn new(replayer: CassetteReplayer) -> Self {
        Self { replayer: Mutex::new(replayer) }
    }
}

impl LlmClient for ReplayingLlmClient {
    fn complete(&self, _request: &CompletionRequest) -> LlmFuture<'_> {
        let output = self
            .replayer
            .lock()
            .map_err(|e| format!("replayer lock poisoned: {e}"))
            .and_then(|mut replayer| {
                replayer.next_interaction("llm", "complete").map(|i| i.output.clone())
            });
        Box::pin(async move {
            let output = output?;
            replay_result::<CompletionResponse>(&output, "llm::complete")
        })
    }
}
