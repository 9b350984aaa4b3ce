//! Client-side search for scout.
//!
//! This crate provides the content sources the server aggregates, the HTTP
//! client for `/api/search`, the two-tier client cache, and the interactive
//! search controller.

pub mod api;
pub mod cache;
pub mod controller;
pub mod sources;

pub use api::{ApiClientError, ApiConfig, SearchApiClient, SearchBackend};
pub use cache::ClientCacheManager;
pub use controller::{ControllerConfig, SearchController, SearchPhase, SearchState};
pub use sources::{
    ContentSource, Project, ProjectIndexSource, RemoteContentSource, RemoteSourceConfig, SourceError, StaticPage,
    StaticPageSource,
};
