//! # Maintenance Server
//!
//! Serves the maintenance trigger, the job endpoints and the health probes.
//!
//! ## Usage
//!
//! ```bash
//! INTERNAL_API_KEY=... DATABASE_URL=postgres://... maintenance-server
//!
//! # Choose a config file and run jobs in process
//! MAINTENANCE_CONFIG=config/production.toml \
//! MAINTENANCE_ORCHESTRATION__DISPATCH=local maintenance-server
//! ```

use anyhow::Context;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

use maintenance_core::bootstrap::{build_app_state, SystemComponents};
use maintenance_core::config::MaintenanceConfig;
use maintenance_core::database::{DatabaseConnection, PgMaintenanceStore};
use maintenance_core::logging;
use maintenance_core::web::create_app;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_structured_logging();

    info!("Starting maintenance server");
    info!("   Version: {}", env!("CARGO_PKG_VERSION"));

    let config = MaintenanceConfig::load().context("Failed to load configuration")?;
    info!(config = %config.sanitized(), "Configuration loaded");

    if config.auth.internal_api_key.is_empty() {
        warn!("INTERNAL_API_KEY is empty; every internal endpoint will answer 401");
    }

    let db = DatabaseConnection::connect(&config.database)
        .await
        .context("Failed to connect to the database")?;
    if config.database.run_migrations {
        db.migrate().await.context("Failed to run migrations")?;
        info!("Database migrations applied");
    }

    let store = Arc::new(PgMaintenanceStore::new(db));
    let components = SystemComponents::from_config(&config, store)?;
    let bind_address = config.server.bind_address.clone();
    let state = build_app_state(config, components)?;

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {bind_address}"))?;
    info!(address = %bind_address, "Maintenance server listening");

    axum::serve(listener, create_app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Maintenance server shutdown complete");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
