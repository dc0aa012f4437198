use std::sync::Arc;

use assetsync_storage::{Storage, StorageResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionDecision {
    Proceed,
    RejectExisting,
}

/// Existence gate on the upload destination
pub struct CollisionGuard {
    destination: Arc<dyn Storage>,
}

impl CollisionGuard {
    pub fn new(destination: Arc<dyn Storage>) -> Self {
        Self { destination }
    }

    /// With `allow_replace` the destination is not consulted at all.
    pub async fn check(&self, name: &str, allow_replace: bool) -> StorageResult<CollisionDecision> {
        if allow_replace {
            return Ok(CollisionDecision::Proceed);
        }

        if self.destination.exists(name).await? {
            tracing::debug!(name = %name, "Upload name already taken at destination");
            Ok(CollisionDecision::RejectExisting)
        } else {
            Ok(CollisionDecision::Proceed)
        }
    }
}
