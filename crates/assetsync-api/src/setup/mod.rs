//! Application setup and initialization
//!
//! Everything `main` needs to go from a loaded [`Config`] to a ready router.

pub mod routes;
pub mod server;
pub mod services;
pub mod storage;
pub mod validation;

use crate::state::AppState;
use anyhow::{Context, Result};
use assetsync_core::Config;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Subscriber first so configuration warnings are recorded
    crate::telemetry::init_telemetry(&config.server)
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    validation::validate_config(&config).context("Configuration validation failed")?;

    tracing::info!("Configuration loaded and validated successfully");

    let remote_sync = storage::setup_remote_sync(&config.sync).await?;

    let state = services::initialize_services(&config, remote_sync).await?;

    let router = routes::setup_routes(&config, state.clone()).await?;

    Ok((state, router))
}
