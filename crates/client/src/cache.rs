//! Two-tier client cache.
//!
//! Reads check the in-memory tier first, then the persistent tier; a valid
//! persistent hit is copied back into memory. Writes go to both tiers.
//! Persistent-tier failures are logged and absorbed so the cache keeps working
//! from memory alone.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use scout_core::cache::{CacheEntry, CacheStore, Clock, PersistentTier, StorageError, SystemClock};
use scout_core::SearchQuery;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

/// Reserved prefix for every persistent key this cache writes.
pub const KEY_PREFIX: &str = "search_cache_";

/// Default time-to-live (5 minutes).
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Default in-memory capacity.
pub const DEFAULT_MAX_ENTRIES: usize = 50;

/// Persistent key for a query: `search_cache_` + normalized query.
pub fn storage_key(query: &SearchQuery) -> String {
    format!("{KEY_PREFIX}{query}")
}

/// Memory tier backed by an optional persistent tier.
pub struct ClientCacheManager<T> {
    memory: Mutex<CacheStore<T>>,
    persistent: Option<Arc<dyn PersistentTier>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<T> ClientCacheManager<T>
where
    T: Clone + Send + Serialize + DeserializeOwned,
{
    /// A cache with both tiers.
    pub fn new(persistent: Arc<dyn PersistentTier>, ttl: Duration, max_entries: usize) -> Self {
        Self { persistent: Some(persistent), ..Self::memory_only(ttl, max_entries) }
    }

    /// A cache with no persistent tier.
    pub fn memory_only(ttl: Duration, max_entries: usize) -> Self {
        Self { memory: Mutex::new(CacheStore::new(max_entries)), persistent: None, ttl, clock: Arc::new(SystemClock) }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Look up a query, consulting memory first and the persistent tier second.
    pub async fn get(&self, query: &str) -> Option<T> {
        let query = SearchQuery::new(query);
        let now = self.clock.now();

        if let Some(hit) = self.memory.lock().await.get(query.as_str(), now) {
            tracing::debug!(query = %query, "client cache hit (memory)");
            return Some(hit);
        }

        let tier = self.persistent.as_ref()?;
        let key = storage_key(&query);

        let stored = match tier.read(&key).await {
            Ok(Some(stored)) => stored,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "persistent cache read failed");
                return None;
            }
        };

        if !stored.is_valid_at(now) {
            self.discard(tier.as_ref(), &key, "expired").await;
            return None;
        }

        let data: T = match serde_json::from_str(&stored.data) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "persistent cache payload undecodable");
                self.discard(tier.as_ref(), &key, "undecodable").await;
                return None;
            }
        };

        tracing::debug!(query = %query, "client cache hit (persistent), hydrating memory");
        let entry = CacheEntry::new(query.as_str(), data.clone(), stored.created_at, stored.ttl);
        let evicted = self.memory.lock().await.insert_entry(entry, now);
        if evicted > 0 {
            self.prune_persistent(now).await;
        }

        Some(data)
    }

    /// Store results for a query with the default TTL.
    pub async fn set(&self, query: &str, data: T) {
        self.set_with_ttl(query, data, self.ttl).await;
    }

    /// Store results for a query in both tiers.
    ///
    /// Never fails; a persistent-tier failure leaves the memory write in place.
    pub async fn set_with_ttl(&self, query: &str, data: T, ttl: Duration) {
        let query = SearchQuery::new(query);
        let now = self.clock.now();
        let payload = serde_json::to_string(&data);

        let evicted = self.memory.lock().await.insert(query.as_str(), data, ttl, now);

        if let Some(tier) = &self.persistent {
            let result = match payload {
                Ok(payload) => tier.write(&CacheEntry::new(storage_key(&query), payload, now, ttl)).await,
                Err(e) => Err(StorageError::Payload(e.to_string())),
            };
            if let Err(e) = result {
                tracing::warn!(query = %query, error = %e, "persistent cache write failed; keeping memory entry only");
            }
        }

        if evicted > 0 {
            self.prune_persistent(now).await;
        }
    }

    /// Remove a query from both tiers.
    pub async fn delete(&self, query: &str) {
        let query = SearchQuery::new(query);
        self.memory.lock().await.remove(query.as_str());

        if let Some(tier) = &self.persistent
            && let Err(e) = tier.remove(&storage_key(&query)).await
        {
            tracing::warn!(query = %query, error = %e, "persistent cache delete failed");
        }
    }

    /// Remove every entry this cache created, in both tiers.
    ///
    /// Only persistent keys under [`KEY_PREFIX`] are touched.
    pub async fn clear(&self) {
        self.memory.lock().await.clear();

        if let Some(tier) = &self.persistent {
            match tier.remove_prefixed(KEY_PREFIX).await {
                Ok(removed) => tracing::debug!(removed, "persistent cache cleared"),
                Err(e) => tracing::warn!(error = %e, "persistent cache clear failed"),
            }
        }
    }

    /// Number of entries in the memory tier.
    pub async fn len(&self) -> usize {
        self.memory.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.memory.lock().await.is_empty()
    }

    async fn discard(&self, tier: &dyn PersistentTier, key: &str, reason: &str) {
        tracing::debug!(key = %key, reason, "dropping persistent cache entry");
        if let Err(e) = tier.remove(key).await {
            tracing::warn!(key = %key, error = %e, "persistent cache delete failed");
        }
    }

    async fn prune_persistent(&self, now: DateTime<Utc>) {
        let Some(tier) = &self.persistent else { return };
        match tier.prune_expired(KEY_PREFIX, now).await {
            Ok(pruned) if pruned > 0 => tracing::debug!(pruned, "pruned expired persistent cache entries"),
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "persistent cache prune failed"),
        }
    }
}
