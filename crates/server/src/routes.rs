//! HTTP routes: `GET /health` and `GET /api/search`.

use std::panic::AssertUnwindSafe;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use futures_util::FutureExt;
use scout_core::SearchResponse;
use serde::Deserialize;

use crate::error::ApiError;
use crate::search::SearchOutcome;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new().route("/health", get(health)).route("/api/search", get(search)).with_state(state)
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: Option<String>,
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn search(
    State(state): State<AppState>, params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Query(params) = params?;
    let Some(raw) = params.q else {
        return Ok(Json(SearchResponse::empty()));
    };

    let outcome = AssertUnwindSafe(state.service.search(&raw))
        .catch_unwind()
        .await
        .map_err(|_| ApiError::Internal("search pipeline panicked".into()))?;

    let response = match outcome {
        SearchOutcome::TooShort => SearchResponse::empty(),
        SearchOutcome::Found { query, results, cached } => SearchResponse::found(query.as_str(), results, cached),
    };
    Ok(Json(response))
}
