//! Configuration validation rules.
//!
//! Checks `AppConfig` values after they have been loaded from environment,
//! files, or defaults.

use std::net::SocketAddr;

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `bind_addr` is not a socket address
    /// - a timeout is under 100ms or over 5 minutes
    /// - a cache TTL or capacity is 0
    /// - `max_results` is outside 1..=100
    /// - `min_query_len` is 0
    /// - `user_agent` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bind_addr.parse::<SocketAddr>().is_err() {
            return Err(invalid("bind_addr", "must be a socket address such as 127.0.0.1:3000"));
        }

        for (field, value) in [("timeout_ms", self.timeout_ms), ("source_timeout_ms", self.source_timeout_ms)] {
            if value < 100 {
                return Err(invalid(field, "must be at least 100ms"));
            }
            if value > 300_000 {
                return Err(invalid(field, "must not exceed 5 minutes (300000ms)"));
            }
        }

        if self.server_cache_ttl_secs == 0 {
            return Err(invalid("server_cache_ttl_secs", "must be greater than 0"));
        }
        if self.client_cache_ttl_secs == 0 {
            return Err(invalid("client_cache_ttl_secs", "must be greater than 0"));
        }
        if self.server_cache_max_entries == 0 {
            return Err(invalid("server_cache_max_entries", "must be greater than 0"));
        }
        if self.client_cache_max_entries == 0 {
            return Err(invalid("client_cache_max_entries", "must be greater than 0"));
        }

        if !(1..=100).contains(&self.max_results) {
            return Err(invalid("max_results", "must be between 1 and 100"));
        }

        if self.min_query_len == 0 {
            return Err(invalid("min_query_len", "must be at least 1"));
        }

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        if self.content_api_url.is_none() && self.content_api_token.is_some() {
            tracing::warn!("content_api_token is set but content_api_url is not; the remote source stays disabled");
        }

        Ok(())
    }
}
