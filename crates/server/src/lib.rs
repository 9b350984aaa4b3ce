//! HTTP front-end for federated search.
//!
//! Serves `GET /api/search` and `GET /health` over axum.

pub mod error;
pub mod routes;
pub mod search;
pub mod state;

use std::net::SocketAddr;

use scout_core::AppConfig;
use tokio::net::TcpListener;

use crate::state::AppState;

/// Bind `config.bind_addr` and serve until Ctrl-C.
pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = config.bind_addr.parse()?;
    let state = AppState::from_config(&config).await?;
    let sources = state.service.aggregator().source_count();
    let app = routes::router(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, sources, "scout server listening");

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    tracing::info!("scout server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
