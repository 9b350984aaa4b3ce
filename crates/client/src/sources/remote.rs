//! Remote content-management source.
//!
//! Queries the CMS posts endpoint over HTTP:
//!
//! - **Endpoint**: `GET {base_url}/posts?search=<q>&limit=<n>`
//! - **Authentication**: optional `Authorization: Bearer <token>`
//! - **Response**: `{"items": [RemoteItem, ...]}`
//!
//! The CMS filter is treated as a prefilter only; every item is re-checked
//! with the same substring match the other sources use.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header;
use scout_core::{ResultType, SearchQuery, SearchResult};
use serde::Deserialize;
use url::Url;

use super::{ContentSource, SourceError};

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default user agent.
const DEFAULT_USER_AGENT: &str = "scout/0.1";

/// Default number of items requested per query.
const DEFAULT_LIMIT: usize = 20;

/// Remote source configuration.
#[derive(Debug, Clone)]
pub struct RemoteSourceConfig {
    /// CMS API base URL, e.g. `https://cms.example.com/api`.
    pub base_url: String,
    /// Optional bearer token.
    pub token: Option<String>,
    /// Request timeout (default: 5s).
    pub timeout: Duration,
    /// User-agent string (default: scout/0.x).
    pub user_agent: String,
    /// Items requested per query (default: 20).
    pub limit: usize,
}

impl Default for RemoteSourceConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            token: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            limit: DEFAULT_LIMIT,
        }
    }
}

/// CMS identifiers arrive as either strings or numbers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RemoteId {
    Text(String),
    Number(i64),
}

impl fmt::Display for RemoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteId::Text(s) => f.write_str(s),
            RemoteId::Number(n) => write!(f, "{n}"),
        }
    }
}

/// An entry returned by the CMS.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteItem {
    pub id: RemoteId,
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    pub slug: String,
    /// Entry kind; absent or `post` means a blog post.
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, alias = "publishedAt")]
    pub published_at: Option<DateTime<Utc>>,
}

impl RemoteItem {
    fn matches(&self, query: &SearchQuery) -> bool {
        query.matches(&self.title)
            || query.matches(&self.excerpt)
            || query.matches_any(self.tags.iter().map(String::as_str))
    }

    fn to_result(&self) -> SearchResult {
        let (kind, url) = match self.kind.as_deref() {
            None | Some("post") => (ResultType::ContentPost, format!("/blog/{}", self.slug)),
            Some(other) => (ResultType::GenericItem, format!("/{}/{}", other, self.slug)),
        };

        SearchResult {
            id: kind.namespaced_id(&self.id.to_string()),
            title: self.title.clone(),
            description: self.excerpt.clone(),
            url,
            kind,
            category: self.category.clone(),
            published_at: self.published_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RemoteItemsResponse {
    #[serde(default)]
    items: Vec<RemoteItem>,
}

/// HTTP client for the CMS posts endpoint.
#[derive(Debug, Clone)]
pub struct RemoteContentSource {
    http: reqwest::Client,
    config: RemoteSourceConfig,
    endpoint: Url,
}

impl RemoteContentSource {
    /// Create a new remote source with the given configuration.
    pub fn new(config: RemoteSourceConfig) -> Result<Self, SourceError> {
        let endpoint = Self::posts_endpoint(&config.base_url)?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| SourceError::Network(Arc::new(e)))?;

        Ok(Self { http, config, endpoint })
    }

    /// `{base_url}/posts`, keeping any path the base URL already has.
    fn posts_endpoint(base_url: &str) -> Result<Url, SourceError> {
        let mut url = Url::parse(base_url).map_err(|e| SourceError::Config(format!("{base_url}: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| SourceError::Config(format!("{base_url}: cannot be a base URL")))?
            .pop_if_empty()
            .push("posts");
        Ok(url)
    }

    fn request_url(&self, query: &SearchQuery) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("search", query.as_str())
            .append_pair("limit", &self.config.limit.to_string());
        url
    }
}

#[async_trait]
impl ContentSource for RemoteContentSource {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResult>, SourceError> {
        let start = Instant::now();
        let url = self.request_url(query);

        tracing::debug!(query = %query, "querying content API");

        let mut request = self.http.get(url).header(header::ACCEPT, "application/json");
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if status.is_client_error() || status.is_server_error() {
            return Err(SourceError::HttpError { status: status.as_u16() });
        }

        let bytes = response.bytes().await?;
        let body: RemoteItemsResponse = serde_json::from_slice(&bytes).map_err(|e| SourceError::Parse(e.to_string()))?;

        let results: Vec<SearchResult> =
            body.items.iter().filter(|item| item.matches(query)).map(RemoteItem::to_result).collect();

        tracing::debug!(elapsed = ?start.elapsed(), count = results.len(), "content API search completed");

        Ok(results)
    }

    fn name(&self) -> &'static str {
        "content-api"
    }
}
