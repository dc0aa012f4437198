//! assetsync processing library
//!
//! Pure, I/O-free building blocks of the upload pipeline: validators that
//! classify an uploaded file and the naming policy that turns an original
//! name into the public and remote names.

pub mod naming;
pub mod validator;

pub use naming::{Clock, IdGenerator, NameFlags, NamePolicy, SystemClock, TimeOrderedIds};
#[cfg(feature = "image")]
pub use validator::ImageValidator;
pub use validator::{validator_for_endpoint, FileValidator, ValidationError, Validator};
