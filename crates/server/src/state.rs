//! Shared handler state: the search service built from configuration.

use std::sync::Arc;

use anyhow::Context;
use scout_client::sources::{
    ContentSource, ProjectIndexSource, RemoteContentSource, RemoteSourceConfig, StaticPageSource,
};
use scout_core::{AppConfig, ResponseCache};

use crate::search::{ResultAggregator, SearchService};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<SearchService>,
}

impl AppState {
    /// Build the source list from `config`: static pages always, the project
    /// index and remote CMS when configured.
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let mut sources: Vec<Arc<dyn ContentSource>> = Vec::new();

        if let Some(path) = &config.projects_path {
            let projects = ProjectIndexSource::load(path)
                .await
                .with_context(|| format!("loading project index from {}", path.display()))?;
            sources.push(Arc::new(projects));
        }

        if let Some(base_url) = &config.content_api_url {
            let remote = RemoteContentSource::new(RemoteSourceConfig {
                base_url: base_url.clone(),
                token: config.content_api_token.clone(),
                timeout: config.source_timeout(),
                user_agent: config.user_agent.clone(),
                ..Default::default()
            })
            .context("configuring content API source")?;
            sources.push(Arc::new(remote));
        }

        sources.push(Arc::new(StaticPageSource::site_pages()));
        Ok(Self::with_sources(sources, config))
    }

    /// Build state around an explicit source list.
    pub fn with_sources(sources: Vec<Arc<dyn ContentSource>>, config: &AppConfig) -> Self {
        let aggregator = ResultAggregator::new(sources, config.source_timeout(), config.max_results);
        let cache = Arc::new(ResponseCache::new(config.server_cache_ttl(), config.server_cache_max_entries));
        let service = SearchService::new(aggregator, cache, config.min_query_len);
        Self { service: Arc::new(service) }
    }
}
