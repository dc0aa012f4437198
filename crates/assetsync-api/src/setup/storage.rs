//! Remote sync setup

use anyhow::Result;
use assetsync_core::SyncConfig;
use assetsync_storage::{create_storage, RemoteSync, StaticHostSync};
use std::sync::Arc;

/// Build the transport for the configured backend and wrap it in the remote sync.
pub async fn setup_remote_sync(config: &SyncConfig) -> Result<Arc<dyn RemoteSync>> {
    tracing::info!("Initializing remote sync...");

    let storage = create_storage(config)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create sync storage: {}", e))?;

    tracing::info!(
        backend = ?storage.backend_type(),
        remote_host = %config.remote_host(),
        prefix = %config.prefix,
        "Remote sync initialized successfully"
    );

    Ok(Arc::new(StaticHostSync::new(
        storage,
        config.remote_host(),
        config.prefix.clone(),
    )))
}
