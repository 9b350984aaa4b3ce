//! Application configuration with layered loading.
//!
//! Configuration is assembled with figment from, highest precedence first:
//!
//! 1. Environment variables (SCOUT_*)
//! 2. TOML config file (if SCOUT_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::cache::response::{DEFAULT_MAX_ENTRIES, DEFAULT_TTL};
use crate::query::MIN_QUERY_LEN;

mod validation;

pub use validation::ConfigError;

/// Application configuration shared by the server and the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Address the search server listens on.
    ///
    /// Set via SCOUT_BIND_ADDR environment variable.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Path to the SQLite database behind the client's persistent cache tier.
    ///
    /// Set via SCOUT_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Base URL the client uses to reach the search server.
    ///
    /// Set via SCOUT_API_BASE_URL environment variable.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// User-Agent string for outbound HTTP requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Client request timeout in milliseconds.
    ///
    /// Set via SCOUT_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Per-source timeout for content adapters in milliseconds.
    #[serde(default = "default_source_timeout_ms")]
    pub source_timeout_ms: u64,

    /// Debounce window for interactive input in milliseconds.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Minimum normalized query length, in characters.
    #[serde(default = "default_min_query_len")]
    pub min_query_len: usize,

    /// Maximum number of aggregated results returned per query.
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    #[serde(default = "default_cache_ttl_secs")]
    pub server_cache_ttl_secs: u64,

    #[serde(default = "default_server_cache_max_entries")]
    pub server_cache_max_entries: usize,

    #[serde(default = "default_cache_ttl_secs")]
    pub client_cache_ttl_secs: u64,

    #[serde(default = "default_client_cache_max_entries")]
    pub client_cache_max_entries: usize,

    /// Base URL of the content-management API. The remote source is disabled when unset.
    ///
    /// Set via SCOUT_CONTENT_API_URL environment variable.
    #[serde(default)]
    pub content_api_url: Option<String>,

    /// Bearer token for the content-management API.
    #[serde(default)]
    pub content_api_token: Option<String>,

    /// JSON file listing projects. The project source is empty when unset.
    #[serde(default)]
    pub projects_path: Option<PathBuf>,
}

fn default_bind_addr() -> String {
    "127.0.0.1:3000".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./scout-cache.sqlite")
}

fn default_api_base_url() -> String {
    "http://127.0.0.1:3000".into()
}

fn default_user_agent() -> String {
    "scout/0.1".into()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_source_timeout_ms() -> u64 {
    5_000
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_min_query_len() -> usize {
    MIN_QUERY_LEN
}

fn default_max_results() -> usize {
    10
}

fn default_cache_ttl_secs() -> u64 {
    DEFAULT_TTL.as_secs()
}

fn default_server_cache_max_entries() -> usize {
    DEFAULT_MAX_ENTRIES
}

fn default_client_cache_max_entries() -> usize {
    50
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            db_path: default_db_path(),
            api_base_url: default_api_base_url(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            source_timeout_ms: default_source_timeout_ms(),
            debounce_ms: default_debounce_ms(),
            min_query_len: default_min_query_len(),
            max_results: default_max_results(),
            server_cache_ttl_secs: default_cache_ttl_secs(),
            server_cache_max_entries: default_server_cache_max_entries(),
            client_cache_ttl_secs: default_cache_ttl_secs(),
            client_cache_max_entries: default_client_cache_max_entries(),
            content_api_url: None,
            content_api_token: None,
            projects_path: None,
        }
    }
}

impl AppConfig {
    /// Client request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn source_timeout(&self) -> Duration {
        Duration::from_millis(self.source_timeout_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn server_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.server_cache_ttl_secs)
    }

    pub fn client_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.client_cache_ttl_secs)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file or environment cannot be parsed, or
    /// validation fails after loading.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(Self::figment())
    }

    /// The layered figment `load` extracts from.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("SCOUT_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment.merge(
            Env::prefixed("SCOUT_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        )
    }

    /// Extract and validate a configuration from an arbitrary figment.
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
