//! assetsync API library
//!
//! HTTP handlers, the upload pipeline and application setup.

// Module declarations
mod handlers;
mod telemetry;
mod utils;

// Public modules
pub mod api_doc;
pub mod error;
pub mod services;
pub mod setup;
pub mod state;

// Re-exports
pub use error::ErrorResponse;
pub use handlers::upload::UploadResponse;
pub use services::upload::{CollisionDecision, CollisionGuard, UploadPipeline};
