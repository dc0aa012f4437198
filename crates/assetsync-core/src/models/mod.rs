//! Domain models for the upload pipeline

pub mod outcome;
pub mod upload;

pub use outcome::{UploadOutcome, UploadState};
pub use upload::{NamedFile, PendingFile, SyncItem, SyncResult, UploadRequest};
