//! Application state shared by the handlers.

use std::sync::Arc;

use assetsync_core::StorageBackend;
use assetsync_storage::RemoteSync;

use crate::services::upload::UploadPipeline;

/// One pipeline per configured endpoint plus the shared remote sync.
///
/// Everything in here is read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub image_upload: Arc<UploadPipeline>,
    pub file_upload: Arc<UploadPipeline>,
    pub remote_sync: Arc<dyn RemoteSync>,
    pub sync_backend: StorageBackend,
}
