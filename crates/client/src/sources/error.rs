//! Content source error types.

use std::sync::Arc;

/// Errors from a single content source.
///
/// The aggregator absorbs these; they never reach an HTTP caller.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SourceError {
    /// The source was configured with unusable settings.
    #[error("invalid source configuration: {0}")]
    Config(String),

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// HTTP error response.
    #[error("HTTP error: {status}")]
    HttpError { status: u16 },

    /// Response or file parse error.
    #[error("parse error: {0}")]
    Parse(String),

    /// A local index file could not be read.
    #[error("failed to load {path}: {reason}")]
    Load { path: String, reason: String },

    /// The source task panicked or was aborted.
    #[error("source task failed: {0}")]
    Task(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { SourceError::Timeout } else { SourceError::Network(Arc::new(err)) }
    }
}
