//! # ranger-server
//!
//! HTTP server for the ranger nearby-device tracker.
//!
//! This binary provides:
//! - REST API for scan ingestion, device snapshots, and distance estimates
//! - A background sweep that evicts stale devices
//! - Structured logging to file and stdout
//!
//! ## Running
//!
//! ```bash
//! # Development
//! cargo run --package ranger-server
//!
//! # Production
//! RANGER_ENV=production RANGER_CONFIG=/etc/ranger/config.toml ./ranger-server
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

use std::path::PathBuf;

use anyhow::Context;
use ranger_core::{default_config_path, Config};
use ranger_server::{api, logging, state::AppState, sweep};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{info, warn};

/// Environment variable overriding the configuration file path.
const CONFIG_PATH_ENV: &str = "RANGER_CONFIG";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init(logging::is_production())?;

    info!(version = env!("CARGO_PKG_VERSION"), "Starting ranger-server");

    let config_path = std::env::var_os(CONFIG_PATH_ENV)
        .map_or_else(default_config_path, PathBuf::from);
    let config = Config::load_or_default(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    info!(
        path = %config_path.display(),
        model = %config.estimation.model,
        max_age_ms = config.registry.max_age_ms,
        "Configuration loaded"
    );

    let addr = config.bind_address()?;
    let sweep_interval = config.registry.sweep_interval();
    let state = AppState::shared(config);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper = sweep::spawn(state.clone(), sweep_interval, shutdown_rx);

    let app = api::create_router(state);
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    shutdown_tx.send_replace(true);
    if let Err(err) = sweeper.await {
        warn!(error = %err, "Sweep task ended abnormally");
    }

    info!("ranger-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
