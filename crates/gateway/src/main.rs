//! Land-registry HTTP gateway
//!
//! Serves the registry API over the on-chain ledger and its Postgres
//! mirror. The ledger is the source of truth; the mirror is rebuilt from it
//! on demand, so the process holds no durable state of its own.

mod config;
mod error;
mod response;
mod routes;
mod state;

use anyhow::{Context, Result};
use landchain_ledger_ethereum::{EthereumLedger, EthereumLedgerConfig};
use landchain_mirror::MirrorDb;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::GatewayConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional; real deployments set the environment directly
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,landchain=debug")),
        )
        .init();

    let config = GatewayConfig::from_env()?;
    let ledger_config = EthereumLedgerConfig::from_env()?;
    info!(
        "Starting gateway on port {} against chain {}",
        config.port, ledger_config.chain_id
    );

    let ledger = Arc::new(EthereumLedger::new(ledger_config)?);
    let db = MirrorDb::connect(&config.database_url).await?;
    let state = AppState::new(ledger, db);

    let app = routes::router(state);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("failed to bind port {}", config.port))?;
    info!("Gateway listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Gateway shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl-C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
