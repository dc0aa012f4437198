use utoipa::OpenApi;

use crate::error::ErrorResponse;
use crate::handlers;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::upload::upload_image,
        handlers::upload::upload_file,
        handlers::sync_remove::remove_remote_file,
    ),
    components(schemas(
        ErrorResponse,
        handlers::upload::UploadResponse,
        handlers::sync_remove::RemoveRequest,
        handlers::sync_remove::RemoveResponse,
    )),
    tags(
        (name = "upload", description = "Single-file upload endpoints"),
        (name = "sync", description = "Remote static host maintenance"),
    ),
    info(
        title = "assetsync API",
        version = "0.1.0",
        description = "Uploads single files, stores them under a public name and syncs them to the static asset host"
    )
)]
pub struct ApiDoc;

/// OpenAPI document served at `/api-docs/openapi.json`
pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
