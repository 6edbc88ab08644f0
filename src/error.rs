//! Error types for nublar
//!
//! Every failure in a training run maps onto one of four fatal categories
//! (configuration, data, numerical, checkpoint) plus serialization and I/O
//! passthrough. There are no retries: the first error aborts the run. Early
//! stopping is not an error and never surfaces here.
//!
//! Messages carry an actionable hint after a `→` separator so an operator
//! can fix the problem without reading source.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias used throughout nublar.
pub type Result<T> = std::result::Result<T, Error>;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or inconsistent run configuration. Surfaced at startup,
    /// before any file is read or any state is built.
    #[error("Invalid configuration: {field} = {value} → {hint}")]
    Config {
        /// Configuration field that failed validation
        field: String,
        /// Offending value, rendered for display
        value: String,
        /// What to change to fix it
        hint: String,
    },

    /// A sample file is missing, unreadable, or malformed.
    #[error("Data error in {}: {reason} → {hint}", .path.display())]
    Data {
        /// File the error was detected in
        path: PathBuf,
        /// What went wrong
        reason: String,
        /// What to change to fix it
        hint: String,
    },

    /// Dataset-level problem not attributable to a single file.
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// Arithmetic produced a non-finite value (divergence, degenerate
    /// statistics, undefined rates).
    #[error("Numerical error: {0}")]
    Numerical(String),

    /// A checkpoint could not be written, read, or trusted.
    #[error("Checkpoint error: {0}")]
    Checkpoint(String),

    /// Serialization or deserialization failure (JSON/YAML).
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Convenience constructor for configuration errors.
    pub fn config(
        field: impl Into<String>,
        value: impl std::fmt::Display,
        hint: impl Into<String>,
    ) -> Self {
        Error::Config {
            field: field.into(),
            value: value.to_string(),
            hint: hint.into(),
        }
    }

    /// Convenience constructor for per-file data errors.
    pub fn data(
        path: impl Into<PathBuf>,
        reason: impl Into<String>,
        hint: impl Into<String>,
    ) -> Self {
        Error::Data {
            path: path.into(),
            reason: reason.into(),
            hint: hint.into(),
        }
    }

    /// Stable machine-readable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Config { .. } => "NBL-001",
            Error::Data { .. } => "NBL-002",
            Error::Dataset(_) => "NBL-003",
            Error::Numerical(_) => "NBL-004",
            Error::Checkpoint(_) => "NBL-005",
            Error::Serialization(_) => "NBL-006",
            Error::Io(_) => "NBL-007",
        }
    }

    /// True for errors an operator can fix by editing the configuration or
    /// the dataset, as opposed to runtime faults.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Error::Config { .. } | Error::Data { .. } | Error::Dataset(_)
        )
    }
}
