//! HTTP error responses.
//!
//! Every error body carries an empty `results` array so clients can treat
//! error and success payloads uniformly.

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use scout_core::ErrorResponse;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The query string could not be parsed.
    #[error("BAD_REQUEST: {0}")]
    BadRequest(String),

    /// The search pipeline failed unexpectedly.
    #[error("INTERNAL: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "search request failed");
                msg
            }
        };
        (status, Json(ErrorResponse::new(message))).into_response()
    }
}
