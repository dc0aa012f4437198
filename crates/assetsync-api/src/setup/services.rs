//! Pipeline wiring

use anyhow::Result;
use assetsync_core::{Config, SyncConfig, UploadConfig};
use assetsync_processing::{validator_for_endpoint, NamePolicy};
use assetsync_storage::{LocalStorage, RemoteSync};
use std::sync::Arc;

use crate::services::upload::UploadPipeline;
use crate::state::AppState;

/// Build one pipeline per endpoint around the shared remote sync
pub async fn initialize_services(
    config: &Config,
    remote_sync: Arc<dyn RemoteSync>,
) -> Result<Arc<AppState>> {
    let image_upload = build_pipeline(&config.image_upload, &config.sync, remote_sync.clone()).await?;
    let file_upload = build_pipeline(&config.file_upload, &config.sync, remote_sync.clone()).await?;

    tracing::info!("Upload pipelines initialized");

    Ok(Arc::new(AppState {
        image_upload: Arc::new(image_upload),
        file_upload: Arc::new(file_upload),
        remote_sync,
        sync_backend: config.sync.backend,
    }))
}

/// Pipeline for one endpoint: validator picked by `only_images`, local
/// destination rooted at the endpoint's path.
pub async fn build_pipeline(
    upload: &UploadConfig,
    sync: &SyncConfig,
    remote_sync: Arc<dyn RemoteSync>,
) -> Result<UploadPipeline> {
    let destination = LocalStorage::new(
        upload.destination_path.clone(),
        upload.public_base_url.clone(),
    )
    .await
    .map_err(|e| {
        anyhow::anyhow!(
            "Failed to open upload directory {}: {}",
            upload.destination_path.display(),
            e
        )
    })?;

    let sync_max_size = sync.max_size_for(&upload.validator_options);

    tracing::debug!(
        path = %upload.destination_path.display(),
        url = %upload.public_base_url,
        param = %upload.upload_param,
        only_images = upload.only_images,
        unique = upload.unique_names,
        translit = upload.translit,
        replace = upload.allow_replace,
        sync_max_size,
        "Upload endpoint configured"
    );

    Ok(UploadPipeline::new(
        upload.clone(),
        validator_for_endpoint(upload),
        Arc::new(NamePolicy::system(sync.remote_suffix)),
        remote_sync,
        Arc::new(destination),
        sync_max_size,
    ))
}
