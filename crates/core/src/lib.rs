//! Core types and shared functionality for scout.
//!
//! This crate provides:
//! - Query normalization and the unified search result model
//! - Generic TTL cache stores and the SQLite-backed persistent tier
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod query;
pub mod result;

pub use cache::{CacheDb, CacheEntry, CacheStore, Clock, ManualClock, PersistentTier, ResponseCache, StorageError, SystemClock};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use query::{MIN_QUERY_LEN, SearchQuery};
pub use result::{ErrorResponse, ResultType, SearchResponse, SearchResult};
