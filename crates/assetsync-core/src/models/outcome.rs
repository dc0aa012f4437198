//! Pipeline outcomes and the states they terminate in

use std::fmt;

use crate::constants::{FILE_ALREADY_EXISTS_ERROR, NO_POST_ERROR, TRANSPORT_ERROR};

/// Stages an upload passes through. The last four are terminal rejections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadState {
    Received,
    Validated,
    Named,
    CollisionChecked,
    Synced,
    Responded,
    RejectedNotPost,
    RejectedValidation,
    RejectedCollision,
    FailedTransport,
    FailedUnexpected,
}

impl fmt::Display for UploadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UploadState::Received => "received",
            UploadState::Validated => "validated",
            UploadState::Named => "named",
            UploadState::CollisionChecked => "collision_checked",
            UploadState::Synced => "synced",
            UploadState::Responded => "responded",
            UploadState::RejectedNotPost => "rejected_not_post",
            UploadState::RejectedValidation => "rejected_validation",
            UploadState::RejectedCollision => "rejected_collision",
            UploadState::FailedTransport => "failed_transport",
            UploadState::FailedUnexpected => "failed_unexpected",
        };
        f.write_str(name)
    }
}

/// Result of one pass through the upload pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Success {
        id: String,
        link: String,
        /// Raw stored name, only reported by generic-file endpoints.
        filename: Option<String>,
    },
    NotPost,
    ValidationError {
        message: String,
    },
    CollisionError,
    TransportError,
    Unexpected {
        message: String,
    },
}

impl UploadOutcome {
    /// Terminal state this outcome leaves the pipeline in.
    pub fn state(&self) -> UploadState {
        match self {
            UploadOutcome::Success { .. } => UploadState::Responded,
            UploadOutcome::NotPost => UploadState::RejectedNotPost,
            UploadOutcome::ValidationError { .. } => UploadState::RejectedValidation,
            UploadOutcome::CollisionError => UploadState::RejectedCollision,
            UploadOutcome::TransportError => UploadState::FailedTransport,
            UploadOutcome::Unexpected { .. } => UploadState::FailedUnexpected,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, UploadOutcome::Success { .. })
    }

    /// Message for the `error` field of the response, `None` on success.
    pub fn error_message(&self) -> Option<String> {
        match self {
            UploadOutcome::Success { .. } => None,
            UploadOutcome::NotPost => Some(NO_POST_ERROR.to_string()),
            UploadOutcome::ValidationError { message } => Some(message.clone()),
            UploadOutcome::CollisionError => Some(FILE_ALREADY_EXISTS_ERROR.to_string()),
            UploadOutcome::TransportError => Some(TRANSPORT_ERROR.to_string()),
            UploadOutcome::Unexpected { message } => Some(message.clone()),
        }
    }
}
