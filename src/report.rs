//! Run reporting: per-file outcome logging and the end-of-run summary.
//!
//! The report only observes; it never changes what the pipelines do.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{FailureKind, FileFailure};

/// One failed file, as it appears in the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureRecord {
    /// Source file that failed.
    pub path: PathBuf,
    /// Failure class.
    pub kind: FailureKind,
    /// Human-readable reason.
    pub reason: String,
}

/// Counters and failure list accumulated over one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Unique identifier of this run.
    pub run_id: Uuid,
    /// Subcommand that produced the report.
    pub command: String,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run finished, once it has.
    pub finished_at: Option<DateTime<Utc>>,
    /// Output files written.
    pub generated: usize,
    /// Candidates left alone (existing output, empty source).
    pub skipped: usize,
    /// Candidates that would have been generated in a dry run.
    pub planned: usize,
    /// Candidates that failed.
    pub failed: usize,
    /// Details for every failure, in encounter order.
    pub failures: Vec<FailureRecord>,
}

impl RunReport {
    /// Starts an empty report.
    #[must_use]
    pub fn new(command: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            command: command.into(),
            started_at,
            finished_at: None,
            generated: 0,
            skipped: 0,
            planned: 0,
            failed: 0,
            failures: Vec::new(),
        }
    }

    /// Records a written output file.
    pub fn record_generated(&mut self, source: &Path, output: &Path) {
        info!(source = %source.display(), output = %output.display(), "generated");
        self.generated += 1;
    }

    /// Records a candidate that was deliberately not processed.
    pub fn record_skipped(&mut self, source: &Path, reason: &str) {
        info!(source = %source.display(), "skipped: {reason}");
        self.skipped += 1;
    }

    /// Records a candidate a dry run would have generated.
    pub fn record_planned(&mut self, source: &Path, output: &Path) {
        info!(source = %source.display(), output = %output.display(), "would generate");
        self.planned += 1;
    }

    /// Records a per-file failure.
    pub fn record_failure(&mut self, failure: &FileFailure) {
        warn!("{failure}");
        self.failed += 1;
        self.failures.push(FailureRecord {
            path: failure.path().to_path_buf(),
            kind: failure.kind(),
            reason: failure.to_string(),
        });
    }

    /// Stamps the finish time.
    pub fn finish(&mut self, at: DateTime<Utc>) {
        self.finished_at = Some(at);
    }

    /// Returns `true` if any file failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// Multi-line summary printed at the end of a run.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let _ = write!(
            out,
            "testsmith {}: {} generated, {} skipped, {} failed",
            self.command, self.generated, self.skipped, self.failed
        );
        if self.planned > 0 {
            let _ = write!(out, ", {} planned (dry run)", self.planned);
        }
        if let Some(finished) = self.finished_at {
            let elapsed = finished - self.started_at;
            let _ = write!(out, " in {:.1}s", elapsed.num_milliseconds() as f64 / 1000.0);
        }
        out.push('\n');
        if !self.failures.is_empty() {
            out.push_str("failures:\n");
            for failure in &self.failures {
                let _ = writeln!(out, "  [{}] {}", failure.kind, failure.reason);
            }
        }
        out
    }

    /// Serializes the report as YAML.
    ///
    /// # Errors
    ///
    /// Returns the serializer message on failure.
    pub fn to_yaml(&self) -> Result<String, String> {
        serde_yaml::to_string(self).map_err(|e| format!("failed to serialize report: {e}"))
    }
}
