//! Client for the server's `/api/search` endpoint.

pub mod error;

pub use error::ApiClientError;

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header;
use scout_core::{ErrorResponse, SearchQuery, SearchResponse, SearchResult};
use url::Url;

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default user agent.
const DEFAULT_USER_AGENT: &str = "scout/0.1";

/// Where the controller gets results from on a cache miss.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn fetch(&self, query: &SearchQuery) -> Result<Vec<SearchResult>, ApiClientError>;
}

/// Search API client configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server base URL, e.g. `http://127.0.0.1:3000`.
    pub base_url: String,
    /// Request timeout (default: 10s).
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000".to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// HTTP client for `GET /api/search`.
#[derive(Debug, Clone)]
pub struct SearchApiClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl SearchApiClient {
    pub fn new(config: ApiConfig) -> Result<Self, ApiClientError> {
        let endpoint = Url::parse(&config.base_url)
            .and_then(|base| base.join("/api/search"))
            .map_err(|e| ApiClientError::Config(format!("{}: {e}", config.base_url)))?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| ApiClientError::Network(Arc::new(e)))?;

        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn request_url(&self, query: &SearchQuery) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("q", query.as_str());
        url
    }
}

#[async_trait]
impl SearchBackend for SearchApiClient {
    async fn fetch(&self, query: &SearchQuery) -> Result<Vec<SearchResult>, ApiClientError> {
        let start = Instant::now();

        let response = self
            .http
            .get(self.request_url(query))
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorResponse>(&bytes).ok().map(|body| body.error);
            return Err(ApiClientError::HttpError { status: status.as_u16(), message });
        }

        let body: SearchResponse = serde_json::from_slice(&bytes).map_err(|e| ApiClientError::Parse(e.to_string()))?;

        tracing::debug!(
            query = %query,
            elapsed = ?start.elapsed(),
            count = body.results.len(),
            cached = ?body.cached,
            "search request completed"
        );

        Ok(body.results)
    }
}
