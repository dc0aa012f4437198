//! Health check handler and response type.

use crate::state::AppState;
use axum::{http::StatusCode, response::IntoResponse, Json};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

const CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Returns "healthy", "timeout", "missing" or "error: {e}" for an upload directory.
async fn check_directory(path: &Path) -> String {
    match tokio::time::timeout(CHECK_TIMEOUT, tokio::fs::try_exists(path)).await {
        Ok(Ok(true)) => "healthy".to_string(),
        Ok(Ok(false)) => "missing".to_string(),
        Ok(Err(e)) => format!("error: {}", e),
        Err(_) => "timeout".to_string(),
    }
}

#[derive(serde::Serialize)]
pub(super) struct HealthCheckResponse {
    pub status: String,
    pub version: &'static str,
    pub sync_backend: String,
    pub image_upload: String,
    pub file_upload: String,
}

pub async fn health_check(state: Arc<AppState>) -> impl IntoResponse {
    let image_upload =
        check_directory(&state.image_upload.config().destination_path).await;
    let file_upload = check_directory(&state.file_upload.config().destination_path).await;

    let healthy = image_upload == "healthy" && file_upload == "healthy";
    if !healthy {
        tracing::warn!(
            image_upload = %image_upload,
            file_upload = %file_upload,
            "Health check found an unavailable upload directory"
        );
    }

    let response = HealthCheckResponse {
        status: if healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION"),
        sync_backend: state.sync_backend.to_string(),
        image_upload,
        file_upload,
    };

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}
