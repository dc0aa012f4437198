//! Remote removal endpoint
//!
//! Clears a file from the static host given its public URL, the same way
//! a cleared or replaced attribute is synced.

use std::collections::BTreeMap;
use std::sync::Arc;

use assetsync_core::{AppError, SyncItem};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

const REMOVE_ATTRIBUTE: &str = "url";

#[derive(Debug, Deserialize, ToSchema)]
pub struct RemoveRequest {
    /// Public URL of the synced file, on the remote host
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RemoveResponse {
    pub removed: bool,
}

#[utoipa::path(
    post,
    path = "/sync/remove",
    tag = "sync",
    request_body = RemoveRequest,
    responses(
        (status = 200, description = "Removal attempted; `removed` reports the host's answer", body = RemoveResponse),
        (status = 400, description = "Missing or foreign URL", body = ErrorResponse)
    )
)]
pub async fn remove_remote_file(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<RemoveRequest>,
) -> Result<Json<RemoveResponse>, HttpAppError> {
    let url = request.url.trim();
    if url.is_empty() {
        return Err(AppError::InvalidInput("url must not be empty".to_string()).into());
    }

    let host = state.remote_sync.remote_host();
    if !url.starts_with(host) {
        return Err(AppError::InvalidInput(format!("url is not on the remote host {}", host)).into());
    }

    let mut items = BTreeMap::new();
    items.insert(REMOVE_ATTRIBUTE.to_string(), SyncItem::RemoteUrl(url.to_string()));

    let removed = state
        .remote_sync
        .sync(items)
        .await
        .iter()
        .all(|result| result.succeeded);

    tracing::info!(url = %url, removed, "Remote removal processed");

    Ok(Json(RemoveResponse { removed }))
}
