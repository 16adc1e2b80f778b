//! Error types for helmdeck-control.

use std::path::PathBuf;

/// Result type alias using [`ConsoleError`].
pub type ConsoleResult<T> = Result<T, ConsoleError>;

/// Errors that can occur in the console service.
///
/// A deployment tool exiting non-zero is not an error here: that is an
/// outcome reported to the caller (see
/// [`DeployOutcome`](crate::reconcile::DeployOutcome)). This type covers the
/// infrastructure failures around those calls.
#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    /// Values document error.
    #[error("values error: {0}")]
    Values(#[from] helmdeck_values::ValuesError),

    /// Failed to invoke or talk to the cluster tooling (not a non-zero exit).
    #[error("cluster error: {0}")]
    Cluster(String),

    /// Failed to write the working values file.
    #[error("failed to write working file {path}: {source}")]
    WorkingFile {
        /// The working file location.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ConsoleError {
    /// Create a cluster error.
    #[must_use]
    pub fn cluster(msg: impl Into<String>) -> Self {
        Self::Cluster(msg.into())
    }

    /// Create an internal error.
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
