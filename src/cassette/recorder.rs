//! Records interactions into a cassette file.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use super::format::{Cassette, Interaction};

/// Records interactions and writes them as a YAML cassette file.
#[derive(Debug)]
pub struct CassetteRecorder {
    path: PathBuf,
    name: String,
    started_at: DateTime<Utc>,
    interactions: Vec<Interaction>,
    next_seq: u64,
}

impl CassetteRecorder {
    /// Create a new recorder that will write to the given path.
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            started_at,
            interactions: Vec::new(),
            next_seq: 0,
        }
    }

    /// Record an interaction. The `seq` field is assigned automatically.
    pub fn record(
        &mut self,
        port: impl Into<String>,
        method: impl Into<String>,
        input: serde_json::Value,
        output: serde_json::Value,
    ) {
        let interaction = Interaction {
            seq: self.next_seq,
            port: port.into(),
            method: method.into(),
            input,
            output,
        };
        self.next_seq += 1;
        self.interactions.push(interaction);
    }

    /// Path the cassette is written to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write everything recorded so far as a YAML cassette.
    ///
    /// Can be called repeatedly; each call rewrites the whole file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self) -> Result<PathBuf, std::io::Error> {
        let cassette = Cassette {
            name: self.name.clone(),
            recorded_at: self.started_at,
            interactions: self.interactions.clone(),
        };
        let yaml = serde_yaml::to_string(&cassette).map_err(std::io::Error::other)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, yaml)?;
        Ok(self.path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_and_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cassettes/run.cassette.yaml");

        let mut recorder = CassetteRecorder::new(&path, "test-recording", Utc::now());
        recorder.record("llm", "complete", json!({"prompt": "a"}), json!({"ok": {"text": "1"}}));
        recorder.record("llm", "complete", json!({"prompt": "b"}), json!({"err": "timeout"}));

        let result_path = recorder.save().expect("save should succeed");
        assert_eq!(result_path, path);

        let content = std::fs::read_to_string(&path).unwrap();
        let cassette = Cassette::from_yaml(&content).unwrap();

        assert_eq!(cassette.name, "test-recording");
        assert_eq!(cassette.interactions.len(), 2);
        assert_eq!(cassette.interactions[0].seq, 0);
        assert_eq!(cassette.interactions[1].seq, 1);
        assert_eq!(cassette.interactions[1].output, json!({"err": "timeout"}));
    }
}
