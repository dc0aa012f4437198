//! Upload endpoints
//!
//! Both endpoints accept any method so the pipeline can answer non-POST
//! requests itself. Every outcome is rendered as HTTP 200; clients tell
//! success from failure by the presence of `error`.

use std::sync::Arc;

use assetsync_core::{AppError, UploadOutcome};
use axum::{
    extract::{FromRequest, Multipart, Request, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::services::upload::{unexpected_outcome, UploadPipeline};
use crate::state::AppState;
use crate::utils::upload::extract_multipart_file;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum UploadResponse {
    Uploaded {
        /// Stored name
        id: String,
        /// Public link: endpoint url followed by the stored name
        filelink: String,
        /// Stored name again, generic-file endpoint only
        #[serde(default, skip_serializing_if = "Option::is_none")]
        filename: Option<String>,
    },
    Failed {
        error: String,
    },
}

impl From<UploadOutcome> for UploadResponse {
    fn from(outcome: UploadOutcome) -> Self {
        match outcome {
            UploadOutcome::Success { id, link, filename } => UploadResponse::Uploaded {
                id,
                filelink: link,
                filename,
            },
            failure => UploadResponse::Failed {
                error: failure.error_message().unwrap_or_default(),
            },
        }
    }
}

#[utoipa::path(
    post,
    path = "/upload/image",
    tag = "upload",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Stored image, or an `error` describing why it was not stored", body = UploadResponse)
    )
)]
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    method: Method,
    request: Request,
) -> Json<UploadResponse> {
    run_upload(&state.image_upload, method, request).await
}

#[utoipa::path(
    post,
    path = "/upload/file",
    tag = "upload",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Stored file, or an `error` describing why it was not stored", body = UploadResponse)
    )
)]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    method: Method,
    request: Request,
) -> Json<UploadResponse> {
    run_upload(&state.file_upload, method, request).await
}

async fn run_upload(pipeline: &UploadPipeline, method: Method, request: Request) -> Json<UploadResponse> {
    if method != Method::POST {
        return Json(pipeline.handle(&method, None).await.into());
    }

    // A body that is not multipart simply carries no file
    let file = match Multipart::from_request(request, &()).await {
        Ok(multipart) => {
            match extract_multipart_file(multipart, &pipeline.config().upload_param).await {
                Ok(file) => file,
                Err(e) => return Json(unexpected_outcome(&e).into()),
            }
        }
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Upload body is not multipart");
            None
        }
    };

    Json(pipeline.handle(&method, file).await.into())
}

/// Renders a body rejected by the request size limit like any other
/// upload outcome: HTTP 200 with an `error` message.
pub(crate) async fn body_limit_as_outcome(response: Response) -> Response {
    if response.status() != StatusCode::PAYLOAD_TOO_LARGE {
        return response;
    }

    let outcome = unexpected_outcome(&AppError::PayloadTooLarge(
        "Request body exceeds the configured limit".to_string(),
    ));
    Json(UploadResponse::from(outcome)).into_response()
}
