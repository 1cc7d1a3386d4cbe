//! Telegram connector web server.
//!
//! Registers bots, receives their webhook deliveries and relays them to the
//! configured downstream endpoint.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::{net::TcpListener, signal};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use telegram_connector::{
    router, AppState, Config, ConnectorStore, HttpRelay, HttpTelegramClient,
    SqliteConnectorStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("connector_starting");

    let config = Config::from_env().context("Failed to load configuration")?;
    info!(
        port = config.port,
        host = %config.host,
        telegram_api_base = %config.telegram_api_base,
        database_path = %config.database_path,
        relay_timeout_ms = config.relay_timeout_ms,
        telegram_timeout_ms = config.telegram_timeout_ms,
        "config_loaded"
    );

    let store = SqliteConnectorStore::open(Path::new(&config.database_path))
        .context("Failed to open connector store")?;
    let existing = store
        .get_all()
        .await
        .context("Failed to read connector store")?;
    info!(connectors = existing.len(), "connector_store_ready");

    let client = reqwest::Client::builder()
        .build()
        .context("Failed to build HTTP client")?;

    let telegram = HttpTelegramClient::new(
        client.clone(),
        config.telegram_api_base.clone(),
        config.telegram_timeout(),
    );
    let relay = HttpRelay::new(
        client,
        config.message_received_url.clone(),
        config.relay_timeout(),
    );

    let port = config.port;
    let state = AppState::new(
        config,
        Arc::new(store),
        Arc::new(telegram),
        Arc::new(relay),
    );
    let app = router(state);

    // Bind to address
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "connector_listening");

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("connector_shutdown_complete");

    Ok(())
}

/// Completes when SIGINT or SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "ctrl_c_handler_failed");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "sigterm_handler_failed");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }

    info!("connector_shutting_down");
}
