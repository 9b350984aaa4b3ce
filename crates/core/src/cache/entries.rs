//! Key-value cache operations on the SQLite database.
//!
//! Rows hold a JSON payload with its creation time and TTL in milliseconds so
//! expiry can be evaluated both in Rust and in SQL.

use std::time::Duration;

use super::connection::CacheDb;
use super::store::CacheEntry;
use crate::Error;
use chrono::{DateTime, Utc};
use tokio_rusqlite::params;

fn ttl_to_ms(ttl: Duration) -> i64 {
    i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX)
}

fn row_to_entry(key: String, payload: String, created_at_ms: i64, ttl_ms: i64) -> Result<CacheEntry<String>, Error> {
    let created_at = DateTime::from_timestamp_millis(created_at_ms)
        .ok_or_else(|| Error::CorruptEntry(format!("{key}: created_at {created_at_ms} out of range")))?;
    let ttl_ms = u64::try_from(ttl_ms).map_err(|_| Error::CorruptEntry(format!("{key}: negative ttl {ttl_ms}")))?;
    Ok(CacheEntry::new(key, payload, created_at, Duration::from_millis(ttl_ms)))
}

impl CacheDb {
    /// Get a stored entry by key, expired or not.
    ///
    /// Returns None if the key doesn't exist.
    pub async fn get_entry(&self, key: &str) -> Result<Option<CacheEntry<String>>, Error> {
        let key = key.to_string();
        self.conn
            .call(move |conn| -> Result<Option<CacheEntry<String>>, Error> {
                let mut stmt = conn.prepare("SELECT payload, created_at_ms, ttl_ms FROM kv_cache WHERE key = ?1")?;

                let result = stmt.query_row(params![key], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?, row.get::<_, i64>(2)?))
                });

                match result {
                    Ok((payload, created_at_ms, ttl_ms)) => row_to_entry(key, payload, created_at_ms, ttl_ms).map(Some),
                    Err(tokio_rusqlite::rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Insert or replace an entry.
    pub async fn put_entry(&self, entry: &CacheEntry<String>) -> Result<(), Error> {
        if entry.key.is_empty() {
            return Err(Error::InvalidInput("cache key cannot be empty".into()));
        }

        let key = entry.key.clone();
        let payload = entry.data.clone();
        let created_at_ms = entry.created_at.timestamp_millis();
        let ttl_ms = ttl_to_ms(entry.ttl);

        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO kv_cache (key, payload, created_at_ms, ttl_ms)
                    VALUES (?1, ?2, ?3, ?4)
                    ON CONFLICT(key) DO UPDATE SET
                        payload = excluded.payload,
                        created_at_ms = excluded.created_at_ms,
                        ttl_ms = excluded.ttl_ms",
                    params![key, payload, created_at_ms, ttl_ms],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Delete an entry. Returns whether a row was removed.
    pub async fn delete_entry(&self, key: &str) -> Result<bool, Error> {
        let key = key.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute("DELETE FROM kv_cache WHERE key = ?1", params![key])?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete every entry whose key starts with `prefix`.
    ///
    /// Compares with `substr` rather than `LIKE` so `_` and `%` in the prefix
    /// are matched literally.
    pub async fn delete_prefixed(&self, prefix: &str) -> Result<u64, Error> {
        let prefix = prefix.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count =
                    conn.execute("DELETE FROM kv_cache WHERE substr(key, 1, length(?1)) = ?1", params![prefix])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete entries under `prefix` that have expired as of `now`.
    ///
    /// Returns the number of deleted entries.
    pub async fn purge_expired_entries(&self, prefix: &str, now: DateTime<Utc>) -> Result<u64, Error> {
        let prefix = prefix.to_string();
        let now_ms = now.timestamp_millis();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute(
                    "DELETE FROM kv_cache
                    WHERE substr(key, 1, length(?1)) = ?1
                    AND created_at_ms + ttl_ms <= ?2",
                    params![prefix, now_ms],
                )?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Count entries under `prefix`, expired ones included.
    pub async fn count_prefixed(&self, prefix: &str) -> Result<u64, Error> {
        let prefix = prefix.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM kv_cache WHERE substr(key, 1, length(?1)) = ?1",
                    params![prefix],
                    |row| row.get(0),
                )?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}
