//! Fan-out across content sources.
//!
//! Every source runs in its own task inside a [`JoinSet`], bounded by a
//! per-source timeout. A source that fails, times out, or panics is logged and
//! contributes nothing; the rest of the response is still served. Dropping the
//! aggregation future drops the `JoinSet`, which aborts any sources still
//! running.

use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::FutureExt;
use scout_client::sources::{ContentSource, SourceError};
use scout_core::{SearchQuery, SearchResult};
use tokio::task::JoinSet;

use super::ranking::rank;

/// Default per-source timeout.
pub const DEFAULT_SOURCE_TIMEOUT: Duration = Duration::from_secs(5);

/// Default number of results returned.
pub const DEFAULT_MAX_RESULTS: usize = 10;

/// Why a source contributed nothing.
#[derive(Debug)]
enum SourceFailure {
    Failed(SourceError),
    TimedOut,
    Panicked,
}

pub struct ResultAggregator {
    sources: Vec<Arc<dyn ContentSource>>,
    source_timeout: Duration,
    max_results: usize,
}

impl ResultAggregator {
    pub fn new(sources: Vec<Arc<dyn ContentSource>>, source_timeout: Duration, max_results: usize) -> Self {
        Self { sources, source_timeout, max_results: max_results.max(1) }
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Query every source concurrently and merge the results.
    ///
    /// Never fails: partial or empty results are a valid answer.
    pub async fn aggregate(&self, query: &SearchQuery) -> Vec<SearchResult> {
        let started = Instant::now();
        let mut join_set = JoinSet::new();

        for (index, source) in self.sources.iter().enumerate() {
            let source = Arc::clone(source);
            let query = query.clone();
            let timeout = self.source_timeout;

            join_set.spawn(async move {
                let call = AssertUnwindSafe(source.search(&query)).catch_unwind();
                let outcome = match tokio::time::timeout(timeout, call).await {
                    Ok(Ok(Ok(results))) => Ok(results),
                    Ok(Ok(Err(e))) => Err(SourceFailure::Failed(e)),
                    Ok(Err(_)) => Err(SourceFailure::Panicked),
                    Err(_) => Err(SourceFailure::TimedOut),
                };
                (index, source.name(), outcome)
            });
        }

        let mut buckets: Vec<Vec<SearchResult>> = vec![Vec::new(); self.sources.len()];
        let mut failed = 0usize;

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, _, Ok(results))) => buckets[index] = results,
                Ok((_, name, Err(failure))) => {
                    failed += 1;
                    match failure {
                        SourceFailure::Failed(e) => tracing::warn!(source = name, error = %e, "content source failed"),
                        SourceFailure::TimedOut => {
                            tracing::warn!(source = name, timeout = ?self.source_timeout, "content source timed out")
                        }
                        SourceFailure::Panicked => tracing::warn!(source = name, "content source panicked"),
                    }
                }
                Err(e) => {
                    failed += 1;
                    tracing::warn!(error = %e, "content source task aborted");
                }
            }
        }

        let mut seen = HashSet::new();
        let mut merged: Vec<SearchResult> =
            buckets.into_iter().flatten().filter(|result| seen.insert(result.id.clone())).collect();

        rank(query, &mut merged);
        merged.truncate(self.max_results);

        tracing::debug!(
            query = %query,
            sources = self.sources.len(),
            failed,
            returned = merged.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "aggregated search results"
        );

        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use scout_client::sources::{Project, ProjectIndexSource, StaticPageSource};
    use scout_core::ResultType;
    use std::sync::atomic::{AtomicBool, Ordering};

    enum Behavior {
        Return(Vec<SearchResult>),
        Delayed(Duration, Vec<SearchResult>),
        Fail,
        Hang,
        Panic,
    }

    struct FakeSource {
        name: &'static str,
        behavior: Behavior,
        finished: Arc<AtomicBool>,
    }

    impl FakeSource {
        fn new(name: &'static str, behavior: Behavior) -> Arc<dyn ContentSource> {
            Arc::new(Self { name, behavior, finished: Arc::new(AtomicBool::new(false)) })
        }
    }

    #[async_trait]
    impl ContentSource for FakeSource {
        async fn search(&self, _query: &SearchQuery) -> Result<Vec<SearchResult>, SourceError> {
            let outcome = match &self.behavior {
                Behavior::Return(results) => Ok(results.clone()),
                Behavior::Delayed(delay, results) => {
                    tokio::time::sleep(*delay).await;
                    Ok(results.clone())
                }
                Behavior::Fail => Err(SourceError::HttpError { status: 503 }),
                Behavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(3_600)).await;
                    Ok(vec![])
                }
                Behavior::Panic => panic!("source exploded"),
            };
            self.finished.store(true, Ordering::SeqCst);
            outcome
        }

        fn name(&self) -> &'static str {
            self.name
        }
    }

    fn post(local: &str, title: &str) -> SearchResult {
        SearchResult {
            id: ResultType::ContentPost.namespaced_id(local),
            title: title.to_string(),
            description: String::new(),
            url: format!("/blog/{local}"),
            kind: ResultType::ContentPost,
            category: None,
            published_at: None,
        }
    }

    fn titles(results: &[SearchResult]) -> Vec<&str> {
        results.iter().map(|r| r.title.as_str()).collect()
    }

    fn project(slug: &str, title: &str, technologies: &[&str]) -> Project {
        Project {
            slug: slug.to_string(),
            title: title.to_string(),
            description: String::new(),
            technologies: technologies.iter().map(|t| t.to_string()).collect(),
            tags: vec![],
            category: None,
            published_at: None,
        }
    }

    #[tokio::test]
    async fn test_projects_then_pages_for_re() {
        let projects = ProjectIndexSource::new(vec![
            project("dashboard", "Dashboard", &["React"]),
            project("api", "API", &["Node"]),
        ]);
        let pages = StaticPageSource::site_pages();
        let sources: Vec<Arc<dyn ContentSource>> = vec![Arc::new(projects), Arc::new(pages)];
        let aggregator = ResultAggregator::new(sources, DEFAULT_SOURCE_TIMEOUT, DEFAULT_MAX_RESULTS);

        let results = aggregator.aggregate(&SearchQuery::new("re")).await;

        assert!(!results.is_empty());
        assert_eq!(results[0].id, "project-dashboard");
        assert!(results.iter().all(|r| r.id != "project-api"));
        let first_page = results.iter().position(|r| r.kind == ResultType::StaticPage);
        if let Some(first_page) = first_page {
            assert!(results[..first_page].iter().all(|r| r.kind == ResultType::StructuredProject));
        }
    }

    #[tokio::test]
    async fn test_failing_source_degrades_gracefully() {
        let sources = vec![
            FakeSource::new("posts", Behavior::Return(vec![post("a", "Alpha"), post("b", "Beta")])),
            FakeSource::new("broken", Behavior::Fail),
            FakeSource::new("more-posts", Behavior::Return(vec![post("c", "Gamma")])),
        ];
        let aggregator = ResultAggregator::new(sources, DEFAULT_SOURCE_TIMEOUT, DEFAULT_MAX_RESULTS);

        let results = aggregator.aggregate(&SearchQuery::new("zz")).await;
        assert_eq!(titles(&results), ["Alpha", "Beta", "Gamma"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_merge_follows_source_order_not_completion_order() {
        let sources = vec![
            FakeSource::new("slow", Behavior::Delayed(Duration::from_millis(500), vec![post("a", "First source")])),
            FakeSource::new("fast", Behavior::Return(vec![post("b", "Second source")])),
        ];
        let aggregator = ResultAggregator::new(sources, DEFAULT_SOURCE_TIMEOUT, DEFAULT_MAX_RESULTS);

        let results = aggregator.aggregate(&SearchQuery::new("zz")).await;
        assert_eq!(titles(&results), ["First source", "Second source"]);
    }

    #[tokio::test]
    async fn test_panicking_source_is_isolated() {
        let sources = vec![
            FakeSource::new("posts", Behavior::Return(vec![post("a", "Alpha")])),
            FakeSource::new("panics", Behavior::Panic),
        ];
        let aggregator = ResultAggregator::new(sources, DEFAULT_SOURCE_TIMEOUT, DEFAULT_MAX_RESULTS);

        let results = aggregator.aggregate(&SearchQuery::new("zz")).await;
        assert_eq!(titles(&results), ["Alpha"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_source_times_out() {
        let sources = vec![
            FakeSource::new("slow", Behavior::Hang),
            FakeSource::new("posts", Behavior::Return(vec![post("a", "Alpha")])),
        ];
        let aggregator = ResultAggregator::new(sources, Duration::from_millis(200), DEFAULT_MAX_RESULTS);

        let results = aggregator.aggregate(&SearchQuery::new("zz")).await;
        assert_eq!(titles(&results), ["Alpha"]);
    }

    #[tokio::test]
    async fn test_all_sources_failing_yields_empty() {
        let sources = vec![FakeSource::new("a", Behavior::Fail), FakeSource::new("b", Behavior::Panic)];
        let aggregator = ResultAggregator::new(sources, DEFAULT_SOURCE_TIMEOUT, DEFAULT_MAX_RESULTS);

        assert!(aggregator.aggregate(&SearchQuery::new("zz")).await.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_ids_keep_first_source() {
        let sources = vec![
            FakeSource::new("first", Behavior::Return(vec![post("shared", "From first")])),
            FakeSource::new("second", Behavior::Return(vec![post("shared", "From second"), post("other", "Other")])),
        ];
        let aggregator = ResultAggregator::new(sources, DEFAULT_SOURCE_TIMEOUT, DEFAULT_MAX_RESULTS);

        let results = aggregator.aggregate(&SearchQuery::new("zz")).await;
        assert_eq!(titles(&results), ["From first", "Other"]);
    }

    #[tokio::test]
    async fn test_truncates_to_max_results() {
        let many: Vec<SearchResult> = (0..25).map(|i| post(&format!("p{i}"), &format!("Post {i}"))).collect();
        let sources = vec![FakeSource::new("posts", Behavior::Return(many))];
        let aggregator = ResultAggregator::new(sources, DEFAULT_SOURCE_TIMEOUT, DEFAULT_MAX_RESULTS);

        let results = aggregator.aggregate(&SearchQuery::new("zz")).await;
        assert_eq!(results.len(), 10);
        assert_eq!(results[0].title, "Post 0");
        assert_eq!(results[9].title, "Post 9");
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_aggregation_aborts_sources() {
        let finished = Arc::new(AtomicBool::new(false));
        let slow = Arc::new(FakeSource { name: "slow", behavior: Behavior::Hang, finished: finished.clone() });
        let aggregator = ResultAggregator::new(vec![slow], Duration::from_secs(60), DEFAULT_MAX_RESULTS);

        let query = SearchQuery::new("zz");
        let outcome = tokio::time::timeout(Duration::from_millis(50), aggregator.aggregate(&query)).await;
        assert!(outcome.is_err());

        tokio::time::sleep(Duration::from_secs(7_200)).await;
        assert!(!finished.load(Ordering::SeqCst));
    }
}
