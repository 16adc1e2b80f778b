//! Error types for helmdeck-values.

use std::path::PathBuf;

/// Result type alias using [`ValuesError`].
pub type ValuesResult<T> = Result<T, ValuesError>;

/// Errors that can occur while loading, saving or parsing a values document.
#[derive(Debug, thiserror::Error)]
pub enum ValuesError {
    /// Failed to read a document from disk.
    #[error("failed to read {path}: {source}")]
    Read {
        /// Path that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to write a document to disk.
    #[error("failed to write {path}: {source}")]
    Write {
        /// Path that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The document is not valid YAML.
    #[error("invalid values document: {0}")]
    Parse(#[source] serde_yaml::Error),

    /// The document could not be serialised back to YAML.
    #[error("failed to serialise values document: {0}")]
    Serialise(#[source] serde_yaml::Error),

    /// The top level of a values document must be a mapping.
    #[error("top level of a values document must be a mapping")]
    NotAMapping,
}
