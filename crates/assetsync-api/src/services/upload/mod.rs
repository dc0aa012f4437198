//! Upload service: the pipeline that turns one inbound file into a synced
//! public file, and the collision guard it consults.

mod collision;
mod pipeline;

pub use collision::{CollisionDecision, CollisionGuard};
pub use pipeline::UploadPipeline;
pub(crate) use pipeline::unexpected_outcome;
