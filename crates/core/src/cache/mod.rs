//! Cache primitives shared by the server and client.
//!
//! - [`CacheStore`]: bounded in-memory TTL map with oldest-half eviction
//! - [`ResponseCache`]: async, shareable wrapper used as the server response cache
//! - [`CacheDb`]: SQLite database behind the client's persistent tier
//! - [`PersistentTier`]: the contract the client cache writes through to

pub mod clock;
pub mod connection;
pub mod entries;
pub mod migrations;
pub mod response;
pub mod store;
pub mod tier;

pub use crate::Error;

pub use clock::{Clock, ManualClock, SystemClock};
pub use connection::CacheDb;
pub use response::ResponseCache;
pub use store::{CacheEntry, CacheStore};
pub use tier::{PersistentTier, StorageError};
