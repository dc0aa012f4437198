//! assetsync core library
//!
//! Domain models, error types, configuration and constants shared by the
//! storage, processing and API crates.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;

pub use config::{
    Config, RemoteSuffix, ServerConfig, SyncConfig, SyncEnvironment, UploadConfig,
    ValidatorOptions,
};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    NamedFile, PendingFile, SyncItem, SyncResult, UploadOutcome, UploadRequest, UploadState,
};
pub use storage_types::StorageBackend;
