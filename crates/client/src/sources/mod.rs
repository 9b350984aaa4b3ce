//! Content sources searched by the aggregator.
//!
//! Each source turns a normalized query into namespaced [`SearchResult`]s using a
//! case-insensitive substring match over its searchable fields. Sources are
//! independent: they share no mutable state and may fail on their own.

pub mod error;
pub mod pages;
pub mod projects;
pub mod remote;

pub use error::SourceError;
pub use pages::{StaticPage, StaticPageSource};
pub use projects::{Project, ProjectIndexSource};
pub use remote::{RemoteContentSource, RemoteItem, RemoteSourceConfig};

use async_trait::async_trait;
use scout_core::{SearchQuery, SearchResult};

/// A provider of matching items for the aggregator.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Return every item matching `query`, in the source's own order.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResult>, SourceError>;

    /// Source name for logging.
    fn name(&self) -> &'static str;
}
