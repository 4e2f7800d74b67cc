//! Error types for comparison runs.
//!
//! Stage failures inside a run are not errors; they are recorded as
//! [`StageFailure`](crate::StageFailure)s. These variants cover the things
//! that stop a run from being configured or persisted at all.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from configuration loading and artifact output.
#[derive(Debug, Error)]
pub enum DiffError {
    /// A configuration or manifest file could not be read.
    #[error("failed to read {path}: {source}")]
    ReadFile {
        /// File that was being read.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// A configuration or manifest file is not valid TOML for its schema.
    #[error("failed to parse {path}: {source}")]
    ParseToml {
        /// File that was being parsed.
        path: PathBuf,
        /// Underlying error.
        source: toml::de::Error,
    },

    /// An artifact could not be written.
    #[error("failed to write {path}: {source}")]
    WriteArtifact {
        /// Artifact path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The run record could not be serialized.
    #[error("failed to serialize run record: {0}")]
    Json(#[from] serde_json::Error),

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for comparison runs.
pub type DiffResult<T> = Result<T, DiffError>;
