pub mod sync_remove;
pub mod upload;
