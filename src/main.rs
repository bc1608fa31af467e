//! world-sync server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints.

use tracing_subscriber::EnvFilter;

use world_sync::app_state::AppState;
use world_sync::build_app;
use world_sync::config::{LogFormat, SyncConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = SyncConfig::from_env()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    tracing::info!(addr = %config.listen_addr, "starting world-sync");

    // Build store, broadcaster and router
    let listen_addr = config.listen_addr;
    let static_dir = config.static_dir.clone();
    let app = build_app(AppState::new(config).await);

    // Start server
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    tracing::info!(addr = %listen_addr, static_dir = %static_dir.display(), "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
