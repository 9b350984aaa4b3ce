//! Persistent cache tier contract.
//!
//! The client cache writes through to a slower, durable store. Every operation
//! returns a [`StorageError`] instead of panicking or swallowing, and the caller
//! decides how to degrade.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio_rusqlite::rusqlite::{self, ErrorCode};

use super::connection::CacheDb;
use super::store::CacheEntry;
use crate::Error;

/// Failures of the persistent tier.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The backing store cannot be reached (closed, disabled, missing).
    #[error("persistent storage unavailable: {0}")]
    Unavailable(String),

    /// The backing store is out of space.
    #[error("persistent storage quota exceeded")]
    QuotaExceeded,

    /// A stored payload could not be encoded or decoded.
    #[error("persistent storage payload invalid: {0}")]
    Payload(String),

    /// Any other backend failure.
    #[error(transparent)]
    Backend(Error),
}

impl From<Error> for StorageError {
    fn from(err: Error) -> Self {
        match err {
            Error::Database(tokio_rusqlite::Error::ConnectionClosed) => {
                StorageError::Unavailable("database connection closed".into())
            }
            Error::Database(tokio_rusqlite::Error::Error(rusqlite::Error::SqliteFailure(e, _)))
                if e.code == ErrorCode::DiskFull =>
            {
                StorageError::QuotaExceeded
            }
            Error::CorruptEntry(msg) => StorageError::Payload(msg),
            other => StorageError::Backend(other),
        }
    }
}

/// A durable key-value tier holding JSON payloads.
#[async_trait]
pub trait PersistentTier: Send + Sync {
    /// Read an entry, expired or not; the caller applies the TTL check.
    async fn read(&self, key: &str) -> Result<Option<CacheEntry<String>>, StorageError>;

    /// Insert or replace an entry.
    async fn write(&self, entry: &CacheEntry<String>) -> Result<(), StorageError>;

    async fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Remove every entry whose key starts with `prefix`.
    async fn remove_prefixed(&self, prefix: &str) -> Result<u64, StorageError>;

    /// Remove expired entries whose key starts with `prefix`.
    async fn prune_expired(&self, prefix: &str, now: DateTime<Utc>) -> Result<u64, StorageError>;
}

#[async_trait]
impl PersistentTier for CacheDb {
    async fn read(&self, key: &str) -> Result<Option<CacheEntry<String>>, StorageError> {
        Ok(self.get_entry(key).await?)
    }

    async fn write(&self, entry: &CacheEntry<String>) -> Result<(), StorageError> {
        Ok(self.put_entry(entry).await?)
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.delete_entry(key).await?;
        Ok(())
    }

    async fn remove_prefixed(&self, prefix: &str) -> Result<u64, StorageError> {
        Ok(self.delete_prefixed(prefix).await?)
    }

    async fn prune_expired(&self, prefix: &str, now: DateTime<Utc>) -> Result<u64, StorageError> {
        Ok(self.purge_expired_entries(prefix, now).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_disk_full_maps_to_quota_exceeded() {
        let failure = rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_FULL);
        let err = Error::from(rusqlite::Error::SqliteFailure(failure, None));
        assert!(matches!(StorageError::from(err), StorageError::QuotaExceeded));
    }

    #[test]
    fn test_closed_connection_maps_to_unavailable() {
        let err = Error::Database(tokio_rusqlite::Error::ConnectionClosed);
        assert!(matches!(StorageError::from(err), StorageError::Unavailable(_)));
    }

    #[test]
    fn test_corrupt_entry_maps_to_payload() {
        let err = Error::CorruptEntry("bad row".into());
        assert!(matches!(StorageError::from(err), StorageError::Payload(_)));
    }

    #[tokio::test]
    async fn test_cache_db_as_tier() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let tier: &dyn PersistentTier = &db;
        let now = Utc::now();

        tier.write(&CacheEntry::new("search_cache_rust", "[]".to_string(), now, Duration::from_secs(60)))
            .await
            .unwrap();
        assert!(tier.read("search_cache_rust").await.unwrap().is_some());

        tier.remove("search_cache_rust").await.unwrap();
        assert!(tier.read("search_cache_rust").await.unwrap().is_none());
    }
}
