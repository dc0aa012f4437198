#[cfg(feature = "storage-http")]
use crate::HttpStaticStorage;
use crate::LocalStorage;
#[cfg(feature = "storage-s3")]
use crate::S3Storage;
use crate::{Storage, StorageBackend, StorageError, StorageResult};
use assetsync_core::SyncConfig;
use std::sync::Arc;
#[cfg(feature = "storage-http")]
use std::time::Duration;

/// Create the storage the remote sync pushes through
pub async fn create_storage(config: &SyncConfig) -> StorageResult<Arc<dyn Storage>> {
    match config.backend {
        #[cfg(feature = "storage-http")]
        StorageBackend::Http => {
            let storage = HttpStaticStorage::new(
                config.remote_host(),
                config.token.clone(),
                Duration::from_secs(config.timeout_secs),
            )?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-http"))]
        StorageBackend::Http => Err(StorageError::ConfigError(
            "HTTP storage backend not available (storage-http feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => {
            let bucket = config
                .s3_bucket
                .clone()
                .ok_or_else(|| StorageError::ConfigError("S3_BUCKET not configured".to_string()))?;
            let region = config.s3_region.clone().ok_or_else(|| {
                StorageError::ConfigError("S3_REGION or AWS_REGION not configured".to_string())
            })?;

            let storage = S3Storage::new(bucket, region, config.s3_endpoint.clone())?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageBackend::S3 => Err(StorageError::ConfigError(
            "S3 storage backend not available (storage-s3 feature not enabled)".to_string(),
        )),

        StorageBackend::Local => {
            let base_path = config.local_path.clone().ok_or_else(|| {
                StorageError::ConfigError("SYNC_LOCAL_PATH not configured".to_string())
            })?;

            let storage = LocalStorage::new(base_path, config.remote_host()).await?;
            Ok(Arc::new(storage))
        }
    }
}
