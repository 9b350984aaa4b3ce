//! Interactive query lifecycle.
//!
//! [`SearchController`] turns a stream of raw keystroke-level queries into
//! published [`SearchState`] snapshots:
//!
//! ```text
//! Idle --(query >= min len)--> Debouncing --(timer, cache miss)--> Loading --> Success | Error
//!                               Debouncing --(timer, cache hit)--> Success
//! Loading --(newer query)--> Debouncing      any --(query cleared)--> Idle
//! ```
//!
//! Every call to [`SearchController::search`] takes a fresh request token and
//! cancels the previous request. State writes happen inside the watch channel's
//! lock and only when the writer's token is still the latest, so a superseded
//! request can never overwrite newer state.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use scout_core::{AppConfig, MIN_QUERY_LEN, SearchQuery, SearchResult};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::api::SearchBackend;
use crate::cache::ClientCacheManager;

/// Where the controller is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchPhase {
    #[default]
    Idle,
    Debouncing,
    Loading,
    Success,
    Error,
}

/// Snapshot exposed to the UI.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchState {
    pub phase: SearchPhase,
    /// Normalized query the state refers to; empty when idle.
    pub query: String,
    pub results: Vec<SearchResult>,
    pub error: Option<String>,
}

impl SearchState {
    pub fn is_loading(&self) -> bool {
        self.phase == SearchPhase::Loading
    }

    fn succeed(&mut self, results: Vec<SearchResult>) {
        self.phase = SearchPhase::Success;
        self.results = results;
        self.error = None;
    }

    /// Errors clear results rather than leaving stale ones on screen.
    fn fail(&mut self, message: String) {
        self.phase = SearchPhase::Error;
        self.results.clear();
        self.error = Some(message);
    }
}

/// Timing and validation knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerConfig {
    pub debounce: Duration,
    pub min_query_len: usize,
    pub request_timeout: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self { debounce: Duration::from_millis(300), min_query_len: MIN_QUERY_LEN, request_timeout: Duration::from_secs(10) }
    }
}

impl From<&AppConfig> for ControllerConfig {
    fn from(config: &AppConfig) -> Self {
        Self { debounce: config.debounce(), min_query_len: config.min_query_len, request_timeout: config.timeout() }
    }
}

/// Everything a spawned request needs, shared with the controller.
#[derive(Clone)]
struct RequestContext {
    backend: Arc<dyn SearchBackend>,
    cache: Arc<ClientCacheManager<Vec<SearchResult>>>,
    state: Arc<watch::Sender<SearchState>>,
    latest: Arc<AtomicU64>,
    config: ControllerConfig,
}

impl RequestContext {
    fn is_current(&self, token: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == token
    }

    /// Apply `update` only if `token` is still the latest. Returns whether it was applied.
    fn publish(&self, token: u64, update: impl FnOnce(&mut SearchState)) -> bool {
        self.state.send_if_modified(|state| {
            if !self.is_current(token) {
                return false;
            }
            update(state);
            true
        })
    }

    async fn run(self, token: u64, query: SearchQuery, cancel: CancellationToken) {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(self.config.debounce) => {}
        }

        if let Some(results) = self.cache.get(query.as_str()).await {
            tracing::debug!(query = %query, token, "serving search from client cache");
            self.publish(token, |state| state.succeed(results));
            return;
        }

        if !self.publish(token, |state| {
            state.phase = SearchPhase::Loading;
            state.error = None;
        }) {
            return;
        }

        let timeout = self.config.request_timeout;
        let outcome = tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!(query = %query, token, "superseded search request cancelled");
                return;
            }
            outcome = tokio::time::timeout(timeout, self.backend.fetch(&query)) => outcome,
        };

        match outcome {
            Ok(Ok(results)) => {
                if !self.is_current(token) {
                    return;
                }
                self.cache.set(query.as_str(), results.clone()).await;
                self.publish(token, |state| state.succeed(results));
            }
            Ok(Err(e)) => {
                tracing::warn!(query = %query, error = %e, "search request failed");
                self.publish(token, |state| state.fail(e.to_string()));
            }
            Err(_) => {
                tracing::warn!(query = %query, ?timeout, "search request timed out");
                self.publish(token, |state| state.fail(format!("request timed out after {}ms", timeout.as_millis())));
            }
        }
    }
}

/// Owns the query lifecycle for one UI context.
///
/// `search` must be called from within a Tokio runtime.
pub struct SearchController {
    ctx: RequestContext,
    inflight: Option<CancellationToken>,
}

impl SearchController {
    pub fn new(
        backend: Arc<dyn SearchBackend>, cache: Arc<ClientCacheManager<Vec<SearchResult>>>, config: ControllerConfig,
    ) -> Self {
        let (state, _) = watch::channel(SearchState::default());
        Self {
            ctx: RequestContext { backend, cache, state: Arc::new(state), latest: Arc::new(AtomicU64::new(0)), config },
            inflight: None,
        }
    }

    /// Start (or restart) a search for `raw`.
    ///
    /// Too-short queries reset to `Idle` immediately without starting a timer.
    pub fn search(&mut self, raw: &str) {
        let token = self.ctx.latest.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(previous) = self.inflight.take() {
            previous.cancel();
        }

        let query = SearchQuery::new(raw);
        if !query.meets_min_len(self.ctx.config.min_query_len) {
            self.ctx.state.send_replace(SearchState::default());
            return;
        }

        self.ctx.state.send_modify(|state| {
            state.phase = SearchPhase::Debouncing;
            state.query = query.to_string();
            state.error = None;
        });

        let cancel = CancellationToken::new();
        self.inflight = Some(cancel.clone());
        tokio::spawn(self.ctx.clone().run(token, query, cancel));
    }

    /// Cancel any pending work and return to `Idle`.
    pub fn clear(&mut self) {
        self.search("");
    }

    /// Current state snapshot.
    pub fn state(&self) -> SearchState {
        self.ctx.state.borrow().clone()
    }

    /// Receive every published state change.
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.ctx.state.subscribe()
    }
}

impl Drop for SearchController {
    fn drop(&mut self) {
        if let Some(inflight) = self.inflight.take() {
            inflight.cancel();
        }
    }
}
