//! Upload pipeline
//!
//! `Received -> Validated -> Named -> CollisionChecked -> Synced -> Responded`.
//! Each stage either hands over to the next one or ends the request with a
//! typed [`UploadOutcome`]. Errors raised along the way are turned into an
//! `Unexpected` outcome exactly once, in [`UploadPipeline::handle`].

use std::sync::Arc;
use std::time::Instant;

use assetsync_core::{
    AppError, ErrorMetadata, NamedFile, PendingFile, UploadConfig, UploadOutcome, UploadRequest,
    UploadState,
};
use assetsync_processing::{NameFlags, NamePolicy, Validator};
use assetsync_storage::{RemoteSync, Storage, StorageError};
use axum::http::Method;

use super::collision::{CollisionDecision, CollisionGuard};
use crate::error::log_error;

pub struct UploadPipeline {
    config: UploadConfig,
    validator: Arc<dyn Validator>,
    names: Arc<NamePolicy>,
    guard: CollisionGuard,
    remote: Arc<dyn RemoteSync>,
    destination: Arc<dyn Storage>,
    sync_max_size: u64,
}

impl UploadPipeline {
    /// # Arguments
    /// * `destination` - Storage rooted at the endpoint's `path`; checked for
    ///   collisions and written once the remote sync succeeded
    /// * `sync_max_size` - Max size encoded into remote names
    pub fn new(
        config: UploadConfig,
        validator: Arc<dyn Validator>,
        names: Arc<NamePolicy>,
        remote: Arc<dyn RemoteSync>,
        destination: Arc<dyn Storage>,
        sync_max_size: u64,
    ) -> Self {
        Self {
            guard: CollisionGuard::new(destination.clone()),
            config,
            validator,
            names,
            remote,
            destination,
            sync_max_size,
        }
    }

    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    fn endpoint(&self) -> &'static str {
        if self.config.only_images {
            "image"
        } else {
            "file"
        }
    }

    /// Runs one request through the pipeline. Never fails: every error ends
    /// up as an outcome.
    pub async fn handle(&self, method: &Method, file: Option<UploadRequest>) -> UploadOutcome {
        if method != Method::POST {
            tracing::debug!(endpoint = self.endpoint(), method = %method, "Upload rejected, not a POST");
            return UploadOutcome::NotPost;
        }

        let start = Instant::now();
        let outcome = match self.run(file).await {
            Ok(outcome) => outcome,
            Err(e) => unexpected_outcome(&e),
        };

        tracing::info!(
            endpoint = self.endpoint(),
            state = %outcome.state(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Upload finished"
        );

        outcome
    }

    async fn run(&self, file: Option<UploadRequest>) -> Result<UploadOutcome, AppError> {
        tracing::debug!(
            stage = %UploadState::Received,
            endpoint = self.endpoint(),
            has_file = file.is_some(),
            "Upload received"
        );

        let validator = self.validator.clone();
        let (file, errors) = tokio::task::spawn_blocking(move || {
            let errors = validator.validate(file.as_ref());
            (file, errors)
        })
        .await
        .map_err(|e| AppError::from(anyhow::Error::new(e).context("Validation task failed")))?;

        if let Some(first) = errors.first() {
            tracing::debug!(
                endpoint = self.endpoint(),
                error_count = errors.len(),
                error = %first,
                "Upload failed validation"
            );
            return Ok(UploadOutcome::ValidationError {
                message: first.to_string(),
            });
        }
        let file = file.ok_or_else(|| {
            AppError::Internal("Validator accepted a request without a file".to_string())
        })?;
        tracing::debug!(stage = %UploadState::Validated, size_bytes = file.declared_size, "Upload validated");

        let flags = NameFlags {
            unique: self.config.unique_names,
            translit: self.config.translit,
        };
        let public_name = self
            .names
            .public_name(&file.original_name, &file.extension, flags);
        tracing::debug!(stage = %UploadState::Named, name = %public_name, "Upload named");

        let decision = self
            .guard
            .check(&public_name, self.config.allow_replace)
            .await?;
        if decision == CollisionDecision::RejectExisting {
            return Ok(UploadOutcome::CollisionError);
        }
        tracing::debug!(stage = %UploadState::CollisionChecked, name = %public_name, "Upload name available");

        let remote_name =
            self.names
                .remote_name(&public_name, file.declared_size, self.sync_max_size);
        let pending = PendingFile {
            file: NamedFile::new(remote_name, file.declared_size),
            bytes: file.bytes.clone(),
            content_type: file.content_type.clone(),
        };
        if !self.remote.upload(&pending).await {
            return Ok(UploadOutcome::TransportError);
        }
        tracing::debug!(
            stage = %UploadState::Synced,
            key = %pending.file.stored_name,
            "Upload synced to remote host"
        );

        // create-if-absent closes the window between the collision check and this write
        match self
            .destination
            .put(
                &public_name,
                file.bytes,
                &file.content_type,
                self.config.allow_replace,
            )
            .await
        {
            Ok(_) => {}
            Err(StorageError::AlreadyExists(_)) => {
                let discarded = self.remote.discard(&pending).await;
                tracing::warn!(
                    name = %public_name,
                    key = %pending.file.stored_name,
                    discarded,
                    "Destination name taken by a concurrent upload"
                );
                return Ok(UploadOutcome::CollisionError);
            }
            Err(e) => return Err(e.into()),
        }

        Ok(UploadOutcome::Success {
            link: self.config.public_link(&public_name),
            filename: (!self.config.only_images).then(|| public_name.clone()),
            id: public_name,
        })
    }
}

/// The single conversion from an error into a response outcome.
/// Sensitive errors only expose their client message.
pub(crate) fn unexpected_outcome(error: &AppError) -> UploadOutcome {
    log_error(error);

    let message = if error.is_sensitive() {
        error.client_message()
    } else {
        error.to_string()
    };
    UploadOutcome::Unexpected { message }
}
