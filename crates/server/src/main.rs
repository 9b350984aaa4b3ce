//! scout-server entry point.
//!
//! Logging goes to stderr as JSON.

use anyhow::Result;
use scout_core::AppConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).json().init();

    let config = AppConfig::load()?;
    tracing::info!(bind_addr = %config.bind_addr, "starting scout server");

    scout_server::run(config).await
}
