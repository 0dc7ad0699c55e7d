//! # Lookout - Endpoint Discovery & Aggregate Health
//!
//! Builds the list of endpoints to monitor from static configuration and
//! Kubernetes service discovery, and serves the aggregate health status
//! reported by the check scheduler.
//!
//! ## Architecture
//! ```text
//! Kubernetes API → Discovery → Endpoint catalog → Check scheduler
//!                                                       ↓
//!                              /health ← Health registry
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;
mod discovery;
mod routes;
mod state;

use config::AppConfig;
use lookout_common::constants::DEFAULT_CONFIG_PATH;
use state::AppState;

/// Lookout - endpoint discovery and aggregate health
#[derive(Parser, Debug)]
#[command(name = "lookout")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH, env = "LOOKOUT_CONFIG_FILE")]
    config: String,

    /// Listen address (overrides config)
    #[arg(short, long, env = "LISTEN_ADDR")]
    listen: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "LOG_LEVEL")]
    log_level: String,

    /// Enable JSON logging output
    #[arg(long, default_value = "false")]
    json_logs: bool,

    /// Render /health as JSON (overrides config)
    #[arg(long, default_value = "false")]
    health_json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Pick up a local .env before reading env-backed arguments
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(&args.log_level, args.json_logs)?;

    info!("🔭 Starting Lookout v{}", env!("CARGO_PKG_VERSION"));

    // Load and validate configuration
    let config = AppConfig::load(&args.config, &args)?;
    info!(
        endpoints = config.endpoints.len(),
        auto_discover = config.discovery.auto_discover,
        "📋 Configuration loaded from {}",
        args.config
    );

    // Create shutdown broadcast channel
    let (shutdown_tx, _) = tokio::sync::broadcast::channel::<()>(1);

    // Initialize application state and the first endpoint catalog
    let state = AppState::new(config);
    let catalog = state
        .refresh_endpoints()
        .await
        .context("Initial service discovery failed")?;
    info!(
        endpoints = catalog.len(),
        discovered = catalog.discovered,
        "✅ Endpoint catalog ready"
    );

    // Spawn re-discovery worker
    let discovery_config = &state.config.discovery;
    if let Some(interval) = discovery_config
        .rediscovery_interval()
        .filter(|_| discovery_config.auto_discover)
    {
        let worker_state = state.clone();
        let worker_shutdown = shutdown_tx.subscribe();
        tokio::spawn(async move {
            discovery::rediscovery_worker(worker_state, interval, worker_shutdown).await;
        });
    }

    // Build router
    let listen_addr = state.config.listen_addr.clone();
    let health_json = state.health.uses_json();
    let app = routes::create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", listen_addr))?;
    info!(health_json = health_json, "🚀 Lookout listening on {}", listen_addr);

    // Handle graceful shutdown
    let shutdown_signal = async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        }
        info!("🛑 Shutdown signal received");
        let _ = shutdown_tx.send(());
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .context("Server error")?;

    info!("👋 Lookout shutdown complete");
    Ok(())
}

/// Initialize structured logging with tracing
fn init_logging(level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
            .context("Failed to initialize logging")?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_thread_ids(true))
            .try_init()
            .context("Failed to initialize logging")?;
    }

    Ok(())
}
