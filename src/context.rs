//! Service context bundling the port trait objects for one run.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::adapters::live::clock::LiveClock;
use crate::adapters::live::filesystem::LiveFileSystem;
use crate::adapters::recording::llm::RecordingLlmClient;
use crate::adapters::replaying::ReplayingLlmClient;
use crate::cassette::format::Cassette;
use crate::cassette::recorder::CassetteRecorder;
use crate::cassette::replayer::CassetteReplayer;
use crate::error::ConfigError;
use crate::ports::clock::Clock;
use crate::ports::filesystem::FileSystem;
use crate::ports::llm::{CompletionRequest, LlmClient, LlmFuture};

/// Bundles all port trait objects into a single context.
///
/// A context is built explicitly at the start of a run and handed to the
/// pipeline; nothing is process-global.
pub struct ServiceContext {
    /// Clock for timestamps and rate-limit pauses.
    pub clock: Box<dyn Clock>,
    /// Filesystem for per-file I/O.
    pub fs: Box<dyn FileSystem>,
    /// LLM client for test generation.
    pub llm: Box<dyn LlmClient>,
    /// Optional cassette recorder, saved by [`ServiceContext::finish`].
    recorder: Option<Arc<Mutex<CassetteRecorder>>>,
}

impl ServiceContext {
    /// Creates a context without a model client, for pipelines that never
    /// call one. Any model call returns an error.
    #[must_use]
    pub fn offline() -> Self {
        Self::with_parts(Box::new(LiveClock), Box::new(LiveFileSystem), Box::new(UnconfiguredLlmClient))
    }

    /// Creates a live context around an already-configured model client.
    #[must_use]
    pub fn live(llm: Box<dyn LlmClient>) -> Self {
        Self::with_parts(Box::new(LiveClock), Box::new(LiveFileSystem), llm)
    }

    /// Creates a live context that also records every model interaction to
    /// a cassette at `path`.
    #[must_use]
    pub fn recording(llm: Box<dyn LlmClient>, path: &Path) -> Self {
        let clock = LiveClock;
        let recorder =
            Arc::new(Mutex::new(CassetteRecorder::new(path, "testsmith-llm", clock.now())));
        let llm = RecordingLlmClient::new(llm, Arc::clone(&recorder));
        Self {
            clock: Box::new(clock),
            fs: Box::new(LiveFileSystem),
            llm: Box::new(llm),
            recorder: Some(recorder),
        }
    }

    /// Creates a context whose model responses come from a cassette file.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be read or parsed.
    pub fn replaying(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Cassette {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let cassette = Cassette::from_yaml(&content)
            .map_err(|reason| ConfigError::Cassette { path: path.to_path_buf(), reason })?;
        let llm = ReplayingLlmClient::new(CassetteReplayer::new(&cassette));
        Ok(Self::with_parts(Box::new(LiveClock), Box::new(LiveFileSystem), Box::new(llm)))
    }

    /// Creates a context from explicit parts (test doubles, custom adapters).
    #[must_use]
    pub fn with_parts(
        clock: Box<dyn Clock>,
        fs: Box<dyn FileSystem>,
        llm: Box<dyn LlmClient>,
    ) -> Self {
        Self { clock, fs, llm, recorder: None }
    }

    /// Ends the run, saving the cassette if this context was recording.
    ///
    /// Returns the cassette path when one was written.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette cannot be written.
    pub fn finish(self) -> Result<Option<PathBuf>, String> {
        let Some(recorder) = self.recorder else {
            return Ok(None);
        };
        let guard = recorder.lock().map_err(|e| format!("cassette recorder poisoned: {e}"))?;
        let path = guard.path().to_path_buf();
        let saved = guard.save();
        saved.map(Some).map_err(|e| format!("Failed to write cassette {}: {e}", path.display()))
    }
}

/// Model client for contexts that must never reach a model.
struct UnconfiguredLlmClient;

impl LlmClient for UnconfiguredLlmClient {
    fn complete(&self, _request: &CompletionRequest) -> LlmFuture<'_> {
        Box::pin(async { Err("LlmClient port not configured for this run".into()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cassette::format::Interaction;
    use chrono::Utc;
    use serde_json::json;

    fn request() -> CompletionRequest {
        CompletionRequest { model: "m".into(), prompt: "p".into(), max_tokens: 8 }
    }

    #[tokio::test]
    async fn offline_context_refuses_model_calls() {
        let ctx = ServiceContext::offline();
        let err = ctx.llm.complete(&request()).await.unwrap_err();
        assert!(err.to_string().contains("not configured"));
        assert_eq!(ctx.finish().unwrap(), None);
    }

    #[tokio::test]
    async fn replaying_context_serves_cassette() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.cassette.yaml");
        let cassette = Cassette {
            name: "test".into(),
            recorded_at: Utc::now(),
            interactions: vec![Interaction {
                seq: 0,
                port: "llm".into(),
                method: "complete".into(),
                input: json!({}),
                output: json!({"ok": {"text": "generated"}}),
            }],
        };
        std::fs::write(&path, serde_yaml::to_string(&cassette).unwrap()).unwrap();

        let ctx = ServiceContext::replaying(&path).unwrap();
        assert_eq!(ctx.llm.complete(&request()).await.unwrap().text, "generated");
    }

    #[test]
    fn replaying_missing_cassette_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = ServiceContext::replaying(&dir.path().join("absent.yaml"));
        assert!(matches!(result, Err(ConfigError::Cassette { .. })));
    }

    #[tokio::test]
    async fn recording_context_saves_on_finish() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rec.cassette.yaml");

        let ctx = ServiceContext::recording(Box::new(UnconfiguredLlmClient), &path);
        let _ = ctx.llm.complete(&request()).await;
        let written = ctx.finish().unwrap();

        assert_eq!(written.as_deref(), Some(path.as_path()));
        let cassette = Cassette::from_yaml(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(cassette.interactions.len(), 1);
        assert!(cassette.interactions[0].output.get("err").is_some());
    }
}
