//! Bounded in-memory TTL store.
//!
//! Entries expire `ttl` after creation and are dropped lazily when read. When an
//! insert pushes the store past `max_entries`, expired entries are purged and,
//! if it is still over capacity, the oldest half (by creation time) is evicted
//! in one batch.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A cached value stamped with its creation time and lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub key: String,
    pub data: T,
    pub created_at: DateTime<Utc>,
    pub ttl: Duration,
}

impl<T> CacheEntry<T> {
    pub fn new(key: impl Into<String>, data: T, created_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self { key: key.into(), data, created_at, ttl }
    }

    /// Valid iff `now - created_at < ttl`.
    ///
    /// An entry stamped in the future (clock skew) counts as freshly created.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        match (now - self.created_at).to_std() {
            Ok(elapsed) => elapsed < self.ttl,
            Err(_) => true,
        }
    }
}

#[derive(Debug)]
struct Slot<T> {
    entry: CacheEntry<T>,
    /// Insertion counter; breaks `created_at` ties during eviction.
    seq: u64,
}

/// A bounded key -> [`CacheEntry`] map with oldest-half batch eviction.
#[derive(Debug)]
pub struct CacheStore<T> {
    slots: HashMap<String, Slot<T>>,
    max_entries: usize,
    next_seq: u64,
}

impl<T: Clone> CacheStore<T> {
    /// Create a store holding at most `max_entries` entries (at least one).
    pub fn new(max_entries: usize) -> Self {
        Self { slots: HashMap::new(), max_entries: max_entries.max(1), next_seq: 0 }
    }

    /// Get a clone of the value stored under `key` if it is still valid.
    pub fn get(&mut self, key: &str, now: DateTime<Utc>) -> Option<T> {
        self.get_entry(key, now).map(|entry| entry.data.clone())
    }

    /// Get the entry stored under `key`, deleting it if it has expired.
    pub fn get_entry(&mut self, key: &str, now: DateTime<Utc>) -> Option<&CacheEntry<T>> {
        let expired = !self.slots.get(key)?.entry.is_valid_at(now);
        if expired {
            self.slots.remove(key);
            return None;
        }
        self.slots.get(key).map(|slot| &slot.entry)
    }

    /// Insert `data` created at `now`. Returns the number of entries removed to stay in bounds.
    pub fn insert(&mut self, key: impl Into<String>, data: T, ttl: Duration, now: DateTime<Utc>) -> usize {
        self.insert_entry(CacheEntry::new(key, data, now, ttl), now)
    }

    /// Insert a prebuilt entry, keeping its original timestamps.
    ///
    /// Replaces any existing entry for the same key. Returns the number of
    /// entries removed to stay in bounds.
    pub fn insert_entry(&mut self, entry: CacheEntry<T>, now: DateTime<Utc>) -> usize {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.slots.insert(entry.key.clone(), Slot { entry, seq });

        if self.slots.len() <= self.max_entries {
            return 0;
        }

        let purged = self.purge_expired(now);
        if self.slots.len() <= self.max_entries {
            return purged;
        }
        purged + self.evict_oldest_half()
    }

    pub fn remove(&mut self, key: &str) -> bool {
        self.slots.remove(key).is_some()
    }

    /// Drop every expired entry. Returns how many were dropped.
    pub fn purge_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.slots.len();
        self.slots.retain(|_, slot| slot.entry.is_valid_at(now));
        before - self.slots.len()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.slots.contains_key(key)
    }

    fn evict_oldest_half(&mut self) -> usize {
        let mut order: Vec<(DateTime<Utc>, u64, String)> = self
            .slots
            .iter()
            .map(|(key, slot)| (slot.entry.created_at, slot.seq, key.clone()))
            .collect();
        order.sort();

        let evict = order.len() / 2;
        for (_, _, key) in order.into_iter().take(evict) {
            self.slots.remove(&key);
        }

        tracing::debug!(evicted = evict, remaining = self.slots.len(), "evicted oldest cache entries");
        evict
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(300);

    fn t(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_get_returns_fresh_entry() {
        let mut store = CacheStore::new(10);
        store.insert("rust", vec![1, 2, 3], TTL, t(0));
        assert_eq!(store.get("rust", t(299)), Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_expired_entry_is_absent_and_purged() {
        let mut store = CacheStore::new(10);
        store.insert("rust", 1, TTL, t(0));

        assert_eq!(store.get("rust", t(300)), None);
        assert!(!store.contains_key("rust"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_expiry_just_past_ttl() {
        let mut store = CacheStore::new(10);
        let created = t(0);
        store.insert("rust", 1, TTL, created);

        let just_after = created + chrono::Duration::from_std(TTL).unwrap() + chrono::Duration::milliseconds(1);
        assert_eq!(store.get("rust", just_after), None);
    }

    #[test]
    fn test_set_replaces_entry_wholesale() {
        let mut store = CacheStore::new(10);
        store.insert("rust", vec![1], TTL, t(0));
        store.insert("rust", vec![2], Duration::from_secs(10), t(100));

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("rust", t(105)), Some(vec![2]));
        assert_eq!(store.get("rust", t(111)), None);
    }

    #[test]
    fn test_over_capacity_evicts_oldest_half() {
        let mut store = CacheStore::new(4);
        for (i, key) in ["a", "b", "c", "d", "e"].iter().enumerate() {
            store.insert(*key, i, TTL, t(i as i64));
        }

        assert_eq!(store.len(), 3);
        assert!(!store.contains_key("a"));
        assert!(!store.contains_key("b"));
        assert!(store.contains_key("c"));
        assert!(store.contains_key("d"));
        assert!(store.contains_key("e"));
    }

    #[test]
    fn test_default_threshold_evicts_fifty() {
        let mut store = CacheStore::new(100);
        for i in 0..101 {
            store.insert(format!("q{i}"), i, TTL, t(i));
        }

        assert_eq!(store.len(), 51);
        assert!(!store.contains_key("q49"));
        assert!(store.contains_key("q50"));
    }

    #[test]
    fn test_eviction_breaks_timestamp_ties_by_insertion_order() {
        let mut store = CacheStore::new(2);
        store.insert("first", 1, TTL, t(0));
        store.insert("second", 2, TTL, t(0));
        store.insert("third", 3, TTL, t(0));

        assert_eq!(store.len(), 2);
        assert!(!store.contains_key("first"));
    }

    #[test]
    fn test_expired_entries_purged_before_evicting() {
        let mut store = CacheStore::new(3);
        store.insert("short", 0, Duration::from_secs(1), t(0));
        store.insert("b", 1, TTL, t(1));
        store.insert("c", 2, TTL, t(2));
        store.insert("d", 3, TTL, t(10));

        assert_eq!(store.len(), 3);
        assert!(!store.contains_key("short"));
        assert!(store.contains_key("b"));
    }

    #[test]
    fn test_size_never_exceeds_bound() {
        for max in 1..8 {
            let mut store = CacheStore::new(max);
            for i in 0..50 {
                store.insert(format!("k{}", i % 13), i, TTL, t(i));
                assert!(store.len() <= max, "len {} exceeded max {}", store.len(), max);
            }
        }
    }

    #[test]
    fn test_insert_entry_keeps_original_timestamp() {
        let mut store = CacheStore::new(10);
        store.insert_entry(CacheEntry::new("rust", 7, t(0), TTL), t(200));

        assert_eq!(store.get("rust", t(250)), Some(7));
        assert_eq!(store.get("rust", t(301)), None);
    }

    #[test]
    fn test_future_timestamp_counts_as_fresh() {
        let entry = CacheEntry::new("rust", (), t(10), TTL);
        assert!(entry.is_valid_at(t(0)));
    }
}
