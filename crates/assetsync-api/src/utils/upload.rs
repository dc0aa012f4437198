//! Multipart extraction for the upload endpoints

use assetsync_core::{AppError, UploadRequest};
use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Extract the file sent under `param`.
///
/// Fields with another name, and fields without a file name, are skipped.
/// `Ok(None)` means no file was sent, which validation reports. A second
/// file under the same name is rejected.
pub async fn extract_multipart_file(
    mut multipart: Multipart,
    param: &str,
) -> Result<Option<UploadRequest>, AppError> {
    let mut file: Option<UploadRequest> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Failed to read multipart", e))?
    {
        if field.name() != Some(param) {
            continue;
        }

        let filename = match field.file_name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => continue,
        };

        if file.is_some() {
            return Err(AppError::InvalidInput(format!(
                "Multiple file fields are not allowed; send exactly one field named '{}'",
                param
            )));
        }

        let content_type = field
            .content_type()
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();

        let data = field
            .bytes()
            .await
            .map_err(|e| multipart_error("Failed to read file data", e))?;

        file = Some(UploadRequest::new(&filename, content_type, data));
    }

    Ok(file)
}

fn multipart_error(context: &str, error: MultipartError) -> AppError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!("{}: {}", context, error.body_text()))
    } else {
        AppError::BadRequest(format!("{}: {}", context, error.body_text()))
    }
}
