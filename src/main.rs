// Main entry point - Dependency injection and server setup
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc, time::Duration};
use tracing_subscriber::EnvFilter;

use crate::infrastructure::config::load_settings;
use crate::infrastructure::http_transport::ReqwestTransport;
use crate::presentation::app_state::AppState;
use crate::presentation::{build_router, spawn_embed_sync};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let settings = load_settings()?;

    // Create transport (infrastructure layer)
    let transport = Arc::new(ReqwestTransport::new(
        &settings.backend.origin,
        Duration::from_secs(settings.backend.timeout_secs),
    )?);

    // Create services and panels (application layer)
    let state = Arc::new(AppState::new(
        settings.widget.initial,
        transport,
        &settings.widget.container,
    ));
    spawn_embed_sync(state.clone());

    // Build router (presentation layer)
    let router = build_router(state);

    // Start server
    let addr: SocketAddr = settings.server.bind.parse()?;
    tracing::info!(
        "Starting powerbi-widget on {} against {}",
        addr,
        settings.backend.origin
    );

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
