//! assetsync storage library
//!
//! Storage abstraction for the upload pipeline and the remote sync built on
//! top of it. Three backends implement [`Storage`]: a local directory (the
//! upload destination, and a stand-in remote host for development), the
//! HTTP static asset host and an S3-compatible bucket.
//!
//! # Key format
//!
//! Keys are relative paths. On the remote host every synced file lives under
//! the configured prefix (`service/{name}` by default). Keys must not contain
//! `..` or a leading `/`. See the `keys` module.

pub mod factory;
pub mod keys;
pub mod local;
#[cfg(feature = "storage-http")]
pub mod http;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod sync;
pub mod traits;

// Re-export commonly used types
pub use assetsync_core::StorageBackend;
pub use factory::create_storage;
#[cfg(feature = "storage-http")]
pub use http::HttpStaticStorage;
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use sync::{RemoteSync, StaticHostSync};
pub use traits::{Storage, StorageError, StorageResult};
