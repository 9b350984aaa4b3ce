//! `scout`: interactive terminal search against a scout server.
//!
//! Each stdin line is fed to a [`SearchController`] as if typed into a search
//! box; state transitions are printed as they are published. `:clear` resets
//! the query and `:quit` (or EOF) exits once the last search settles.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use scout_client::{
    ApiConfig, ClientCacheManager, ControllerConfig, SearchApiClient, SearchController, SearchPhase, SearchState,
};
use scout_core::{AppConfig, CacheDb, SearchResult};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "scout", version, about = "Interactive federated search", rename_all = "kebab")]
struct Args {
    /// Server base URL; overrides `SCOUT_API_BASE_URL`.
    #[arg(long, value_name = "URL")]
    api_base_url: Option<String>,

    /// Client cache database; overrides `SCOUT_DB_PATH`.
    #[arg(long, value_name = "FILE")]
    db_path: Option<PathBuf>,

    /// Keep the client cache in memory only.
    #[arg(long)]
    memory_only: bool,

    /// Remove cached searches from the client cache and exit.
    #[arg(long)]
    clear_cache: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let args = Args::parse();
    let mut config = AppConfig::load()?;
    if let Some(url) = args.api_base_url {
        config.api_base_url = url;
    }
    if let Some(path) = args.db_path {
        config.db_path = path;
    }

    let cache = Arc::new(open_cache(&config, args.memory_only).await);

    if args.clear_cache {
        cache.clear().await;
        println!("client cache cleared");
        return Ok(());
    }

    let client = SearchApiClient::new(ApiConfig {
        base_url: config.api_base_url.clone(),
        timeout: config.timeout(),
        user_agent: config.user_agent.clone(),
    })?;
    let mut controller = SearchController::new(Arc::new(client), cache, ControllerConfig::from(&config));

    let mut updates = controller.subscribe();
    let printer = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let state = updates.borrow_and_update().clone();
            println!("{}", render(&state));
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            ":quit" => break,
            ":clear" => controller.clear(),
            _ => controller.search(&line),
        }
    }

    let mut settled = controller.subscribe();
    let _ = settled.wait_for(|state| !matches!(state.phase, SearchPhase::Debouncing | SearchPhase::Loading)).await;

    drop(controller);
    let _ = printer.await;
    Ok(())
}

/// Open the client cache, falling back to memory-only when the database is unusable.
async fn open_cache(config: &AppConfig, memory_only: bool) -> ClientCacheManager<Vec<SearchResult>> {
    let ttl = config.client_cache_ttl();
    let max_entries = config.client_cache_max_entries;

    if memory_only {
        return ClientCacheManager::memory_only(ttl, max_entries);
    }

    match CacheDb::open(&config.db_path).await {
        Ok(db) => ClientCacheManager::new(Arc::new(db), ttl, max_entries),
        Err(e) => {
            tracing::warn!(path = %config.db_path.display(), error = %e, "cache database unavailable, using memory only");
            ClientCacheManager::memory_only(ttl, max_entries)
        }
    }
}

fn render(state: &SearchState) -> String {
    match state.phase {
        SearchPhase::Idle => "idle".to_string(),
        SearchPhase::Debouncing => format!("typing: {}", state.query),
        SearchPhase::Loading => format!("searching: {}", state.query),
        SearchPhase::Error => {
            format!("error: {} ({})", state.query, state.error.as_deref().unwrap_or("unknown error"))
        }
        SearchPhase::Success if state.results.is_empty() => format!("no results for {}", state.query),
        SearchPhase::Success => {
            let mut out = format!("{} result(s) for {}", state.results.len(), state.query);
            for result in &state.results {
                out.push_str(&format!("\n  [{}] {} {}", result.kind.id_prefix(), result.title, result.url));
            }
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_core::ResultType;

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from(["scout", "--memory-only", "--api-base-url", "http://localhost:4000"]).unwrap();
        assert!(args.memory_only);
        assert!(!args.clear_cache);
        assert_eq!(args.api_base_url.as_deref(), Some("http://localhost:4000"));
    }

    #[test]
    fn test_render_success() {
        let state = SearchState {
            phase: SearchPhase::Success,
            query: "rust".to_string(),
            results: vec![SearchResult {
                id: "post-rust".to_string(),
                title: "Rust".to_string(),
                description: String::new(),
                url: "/blog/rust".to_string(),
                kind: ResultType::ContentPost,
                category: None,
                published_at: None,
            }],
            error: None,
        };
        assert_eq!(render(&state), "1 result(s) for rust\n  [post] Rust /blog/rust");
    }

    #[test]
    fn test_render_error_and_idle() {
        let state = SearchState {
            phase: SearchPhase::Error,
            query: "rust".to_string(),
            results: vec![],
            error: Some("HTTP error: 500".to_string()),
        };
        assert_eq!(render(&state), "error: rust (HTTP error: 500)");
        assert_eq!(render(&SearchState::default()), "idle");
    }
}
