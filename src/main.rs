//! ==============================================================================
//! main.rs - flora host entry point
//! ==============================================================================
//!
//! purpose:
//!     serves the FloraPro dashboard. each page load or api call polls the
//!     sixteen blynk virtual pins of the device and renders the result.
//!
//! responsibilities:
//!     - load configuration (flora.toml, .env, environment)
//!     - initialise logging
//!     - build the shared relay client (one connection pool)
//!     - serve the dashboard and json api until ctrl+c
//!
//! architecture:
//!
//!     ┌──────────────────────────────────────────────────────────┐
//!     │                    rust host (this file)                  │
//!     │   ┌─────────────────────┐      ┌──────────────────────┐   │
//!     │   │ web server (axum)   │ ───▶ │ relay client         │   │
//!     │   │ /, /api/*           │      │ 16 pins, joined      │   │
//!     │   └─────────────────────┘      └──────────┬───────────┘   │
//!     └──────────────────────────────────────────┼────────────────┘
//!                                                 │ https, 3s per pin
//!                                                 ▼
//!                                       ┌───────────────────┐
//!                                       │ blynk cloud relay │
//!                                       └───────────────────┘
//!
//! ==============================================================================

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use flora_host::config::HostConfig;
use flora_host::relay::RelayClient;
use flora_host::server::{self, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // step 1: load configuration, logging startup messages at info
    let bootstrap = tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).finish();
    let config = tracing::subscriber::with_default(bootstrap, HostConfig::load_or_default);

    // step 2: logging; RUST_LOG wins over the config file
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .context("invalid logging.level")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("===========================================================");
    info!("  Flora Host v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================================");
    config.print_summary();
    config.validate().context("invalid configuration")?;

    // step 3: relay client shared by every request
    let relay = RelayClient::new()
        .context("failed to create relay client")?
        .with_timeout(config.relay.timeout());

    // step 4: serve until ctrl+c
    let addr = config.bind_addr()?;
    let app = server::router(AppState::new(relay, config));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!("[STARTUP] ✓ Dashboard live at http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("web server error")?;

    info!("[SHUTDOWN] bye");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down..."),
        Err(e) => {
            // without a signal handler, run until killed
            tracing::warn!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
