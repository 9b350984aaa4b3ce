//! Process-wide response cache.
//!
//! A [`CacheStore`] behind an async mutex, meant to be built once and shared by
//! `Arc` between request handlers. Writes are last-writer-wins.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use super::clock::{Clock, SystemClock};
use super::store::CacheStore;

/// Default time-to-live for cached responses (5 minutes).
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Default capacity before oldest-half eviction kicks in.
pub const DEFAULT_MAX_ENTRIES: usize = 100;

/// Shared TTL cache keyed by normalized query.
#[derive(Debug)]
pub struct ResponseCache<T> {
    store: Mutex<CacheStore<T>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<T: Clone + Send> ResponseCache<T> {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self::with_clock(ttl, max_entries, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, max_entries: usize, clock: Arc<dyn Clock>) -> Self {
        Self { store: Mutex::new(CacheStore::new(max_entries)), ttl, clock }
    }

    /// Get a cached value. Expired entries are removed and reported absent.
    pub async fn get(&self, key: &str) -> Option<T> {
        let now = self.clock.now();
        self.store.lock().await.get(key, now)
    }

    /// Store `data` under `key` with the default TTL, replacing any previous entry.
    pub async fn set(&self, key: &str, data: T) {
        self.set_with_ttl(key, data, self.ttl).await;
    }

    pub async fn set_with_ttl(&self, key: &str, data: T, ttl: Duration) {
        let now = self.clock.now();
        let removed = self.store.lock().await.insert(key, data, ttl, now);
        if removed > 0 {
            tracing::debug!(removed, "response cache trimmed");
        }
    }

    pub async fn len(&self) -> usize {
        self.store.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.lock().await.is_empty()
    }

    pub async fn clear(&self) {
        self.store.lock().await.clear();
    }
}

impl<T: Clone + Send> Default for ResponseCache<T> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, DEFAULT_MAX_ENTRIES)
    }
}
