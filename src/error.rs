//! Error types for per-file failures and fatal configuration problems.

use std::path::PathBuf;

use serde::Serialize;

/// A failure confined to one candidate file.
///
/// The run records it and moves on to the next file; it never aborts the run.
#[derive(Debug, thiserror::Error)]
pub enum FileFailure {
    /// The source file could not be read (missing, permissions, not UTF-8).
    #[error("cannot read {}: {reason}", path.display())]
    Read {
        /// Offending source file.
        path: PathBuf,
        /// Underlying I/O diagnostic.
        reason: String,
    },

    /// The source text is not syntactically valid.
    #[error("parse failed: {}:{line}:{column}: {reason}", path.display())]
    Parse {
        /// Offending source file.
        path: PathBuf,
        /// 1-based line of the first syntax error.
        line: usize,
        /// 1-based column of the first syntax error.
        column: usize,
        /// Parser diagnostic.
        reason: String,
    },

    /// The output file could not be written.
    #[error("cannot write {}: {reason}", output.display())]
    Write {
        /// Source file the output belongs to.
        path: PathBuf,
        /// Output file that failed.
        output: PathBuf,
        /// Underlying I/O diagnostic.
        reason: String,
    },

    /// The remote model call failed or timed out.
    #[error("remote generation failed for {}: {reason}", path.display())]
    RemoteGeneration {
        /// Source file whose generation failed.
        path: PathBuf,
        /// Transport or API diagnostic.
        reason: String,
    },

    /// The remote model answered with no usable text.
    #[error("model returned empty content for {}", path.display())]
    EmptyResponse {
        /// Source file whose generation produced nothing.
        path: PathBuf,
    },

    /// Another input of this run already claimed the same output name.
    #[error("output {} for {} is already claimed by {}", output.display(), path.display(), claimed_by.display())]
    OutputCollision {
        /// Source file that lost the claim.
        path: PathBuf,
        /// Contested output file.
        output: PathBuf,
        /// Source file that claimed the name first.
        claimed_by: PathBuf,
    },
}

/// Coarse classification of a [`FileFailure`], used in run reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// See [`FileFailure::Read`].
    Read,
    /// See [`FileFailure::Parse`].
    Parse,
    /// See [`FileFailure::Write`].
    Write,
    /// See [`FileFailure::RemoteGeneration`] and [`FileFailure::EmptyResponse`].
    RemoteGeneration,
    /// See [`FileFailure::OutputCollision`].
    OutputCollision,
}

impl FailureKind {
    /// Snake-case name, as used in summaries and YAML reports.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Parse => "parse",
            Self::Write => "write",
            Self::RemoteGeneration => "remote_generation",
            Self::OutputCollision => "output_collision",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FileFailure {
    /// Source file this failure is about.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Read { path, .. }
            | Self::Parse { path, .. }
            | Self::Write { path, .. }
            | Self::RemoteGeneration { path, .. }
            | Self::EmptyResponse { path }
            | Self::OutputCollision { path, .. } => path,
        }
    }

    /// Report classification of this failure.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Read { .. } => FailureKind::Read,
            Self::Parse { .. } => FailureKind::Parse,
            Self::Write { .. } => FailureKind::Write,
            Self::RemoteGeneration { .. } | Self::EmptyResponse { .. } => {
                FailureKind::RemoteGeneration
            }
            Self::OutputCollision { .. } => FailureKind::OutputCollision,
        }
    }
}

/// A fatal configuration problem detected before any file is processed.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The API key environment variable is unset or empty.
    #[error("{var} is not set; export it or add it to .env")]
    MissingApiKey {
        /// Name of the environment variable that was consulted.
        var: String,
    },

    /// The config file exists but could not be read.
    #[error("cannot read config file {}: {reason}", path.display())]
    Unreadable {
        /// Config file path.
        path: PathBuf,
        /// Underlying I/O diagnostic.
        reason: String,
    },

    /// The config file is not valid YAML for the expected schema.
    #[error("invalid config file {}: {reason}", path.display())]
    Invalid {
        /// Config file path.
        path: PathBuf,
        /// Deserializer diagnostic.
        reason: String,
    },

    /// An output-name affix contains characters outside `[A-Za-z0-9_]`.
    #[error("{field} {value:?} may only contain ASCII letters, digits and '_'")]
    InvalidAffix {
        /// Which affix (`prefix`, `suffix`, `extension`).
        field: &'static str,
        /// The rejected value.
        value: String,
    },

    /// The request rate must be strictly positive.
    #[error("requests per minute must be greater than zero")]
    InvalidRate,

    /// The prompt template lacks the `{source}` placeholder.
    #[error("prompt template must contain the {{source}} placeholder")]
    InvalidPromptTemplate,

    /// The bundled parser grammar could not be loaded.
    #[error("cannot load parser grammar: {0}")]
    Grammar(String),

    /// The HTTP client could not be constructed.
    #[error("cannot build HTTP client: {0}")]
    HttpClient(String),

    /// The cassette used for replay could not be loaded.
    #[error("cannot load cassette {}: {reason}", path.display())]
    Cassette {
        /// Cassette path.
        path: PathBuf,
        /// Read or parse diagnostic.
        reason: String,
    },
}
