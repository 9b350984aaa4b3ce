//! Search API client error types.

use std::sync::Arc;

/// Errors from the client's `/api/search` requests.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiClientError {
    /// The client was configured with an unusable base URL.
    #[error("invalid API configuration: {0}")]
    Config(String),

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// HTTP error response, with the server's message when it sent one.
    #[error("HTTP error: {status}{}", detail(.message))]
    HttpError { status: u16, message: Option<String> },

    /// Response parse error.
    #[error("parse error: {0}")]
    Parse(String),
}

fn detail(message: &Option<String>) -> String {
    message.as_ref().map(|m| format!(" ({m})")).unwrap_or_default()
}

impl From<reqwest::Error> for ApiClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { ApiClientError::Timeout } else { ApiClientError::Network(Arc::new(err)) }
    }
}
