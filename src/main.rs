// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

use crate::application::fleet_service::FleetService;
use crate::application::history_store::HistoryStore;
use crate::application::machine_catalog::MachineCatalog;
use crate::application::session_runner::SessionRunner;
use crate::application::telemetry_session::TelemetrySession;
use crate::infrastructure::config::load_app_config;
use crate::infrastructure::json_file_store::JsonFileStore;
use crate::infrastructure::static_catalog::StaticCatalog;
use crate::presentation::app_state::AppState;
use crate::presentation::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = load_app_config()?;

    // Static data sources (infrastructure layer)
    let catalog: Arc<dyn MachineCatalog> = Arc::new(StaticCatalog::new());
    let store = config.persistence.enabled.then(|| {
        Arc::new(JsonFileStore::new(config.persistence.path.clone())) as Arc<dyn HistoryStore>
    });

    // Create session and services (application layer)
    let rng = match config.session.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let session = TelemetrySession::new(
        catalog.clone(),
        config.session_settings(),
        &config.session.initial_machine_id,
        rng,
        Utc::now(),
    );
    let (session_handle, session_task) =
        SessionRunner::spawn(session, store, config.debounce_window());

    // Create application state
    let state = Arc::new(AppState {
        fleet_service: FleetService::new(catalog),
        session: session_handle.clone(),
    });

    // Start server (presentation layer)
    let addr: SocketAddr = config.server.bind.parse()?;
    tracing::info!("Starting machine-telemetry service on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let shutdown_signal = async {
        let _ = tokio::signal::ctrl_c().await;
    };
    server::serve(listener, server::router(state), session_handle, shutdown_signal).await?;

    // The session was stopped during graceful shutdown; wait for its last write
    session_task.await?;

    Ok(())
}
