// API Server Binary Entry Point
//
// Purpose: Start the Axum API server over the CSV plant store
// Usage: cargo run --features api --bin api_server

use plant_care_rust::{create_router, AppConfig, AppState};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (structured logging)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    // Default log level: info for our crate, warn for others
                    "plant_care_rust=info,api_server=info,tower_http=debug,warn".into()
                }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting API server...");

    let config = AppConfig::from_env();

    tracing::info!("Configuration:");
    tracing::info!("  DATA_DIR: {}", config.data_dir.display());
    tracing::info!("  PORT: {}", config.port);
    tracing::info!("  POLISHING: {}", if config.polish.enabled() { "enabled" } else { "disabled" });

    let state = AppState::from_config(&config)?;
    tracing::info!("Application state initialized successfully");

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
