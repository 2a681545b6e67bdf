//! attendance-gateway server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use attendance_gateway::api;
use attendance_gateway::app_state::AppState;
use attendance_gateway::config::{GatewayConfig, LogFormat};
use attendance_gateway::domain::SystemClock;
use attendance_gateway::persistence::{AttendanceStore, MemoryStore, PostgresStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config =
        GatewayConfig::from_env().map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }

    tracing::info!(addr = %config.listen_addr, "starting attendance-gateway");

    let store: Arc<dyn AttendanceStore> = if config.persistence_enabled {
        let store = PostgresStore::connect(&config)
            .await
            .context("connecting to PostgreSQL")?;
        if config.run_migrations {
            store.migrate().await.context("running migrations")?;
            tracing::info!("migrations applied");
        }
        Arc::new(store)
    } else {
        tracing::warn!("persistence disabled, attendance is kept in memory only");
        Arc::new(MemoryStore::new())
    };

    let app_state = AppState::new(
        store,
        Arc::new(SystemClock),
        config.check_in,
        config.event_bus_capacity,
    );
    let app = api::build_app(app_state, Duration::from_secs(config.request_timeout_secs));

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
