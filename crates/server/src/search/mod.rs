//! Server-side search pipeline: response cache in front of the aggregator.

pub mod aggregator;
pub mod ranking;

use std::sync::Arc;

use scout_core::{ResponseCache, SearchQuery, SearchResult};

pub use aggregator::{DEFAULT_MAX_RESULTS, DEFAULT_SOURCE_TIMEOUT, ResultAggregator};

/// Outcome of one search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The normalized query is below the minimum length; nothing was searched.
    TooShort,
    Found { query: SearchQuery, results: Vec<SearchResult>, cached: bool },
}

pub struct SearchService {
    aggregator: ResultAggregator,
    cache: Arc<ResponseCache<Vec<SearchResult>>>,
    min_query_len: usize,
}

impl SearchService {
    pub fn new(aggregator: ResultAggregator, cache: Arc<ResponseCache<Vec<SearchResult>>>, min_query_len: usize) -> Self {
        Self { aggregator, cache, min_query_len }
    }

    pub fn cache(&self) -> &ResponseCache<Vec<SearchResult>> {
        &self.cache
    }

    pub fn aggregator(&self) -> &ResultAggregator {
        &self.aggregator
    }

    /// Serve `raw` from the response cache, aggregating on a miss.
    ///
    /// Concurrent misses for one query both aggregate; the later write wins.
    pub async fn search(&self, raw: &str) -> SearchOutcome {
        let query = SearchQuery::new(raw);
        if !query.meets_min_len(self.min_query_len) {
            return SearchOutcome::TooShort;
        }

        if let Some(results) = self.cache.get(query.as_str()).await {
            tracing::debug!(query = %query, count = results.len(), "response cache hit");
            return SearchOutcome::Found { query, results, cached: true };
        }

        tracing::debug!(query = %query, "response cache miss");
        let results = self.aggregator.aggregate(&query).await;
        self.cache.set(query.as_str(), results.clone()).await;

        SearchOutcome::Found { query, results, cached: false }
    }
}
