//! Response sentinels and configuration defaults.

/// Error payload returned for any verb other than POST.
pub const NO_POST_ERROR: &str = "NoPost";

/// Error payload returned when the computed name already exists and replace is disabled.
pub const FILE_ALREADY_EXISTS_ERROR: &str = "File already exists";

/// Error payload returned when the remote static host did not accept the file.
/// Transport details are intentionally not part of the response.
pub const TRANSPORT_ERROR: &str = "Failed to upload file";

/// Multipart field name used when none is configured.
pub const DEFAULT_UPLOAD_PARAM: &str = "file";

/// Sub-path on the remote static host that receives synced files.
pub const DEFAULT_SYNC_PREFIX: &str = "service/";

/// Max size encoded into remote names when neither `SYNC_MAX_SIZE` nor a
/// validator `maxSize` is configured.
pub const DEFAULT_SYNC_MAX_SIZE: u64 = 10 * 1024 * 1024;

/// Suffix forced onto remote names by default.
pub const REMOTE_NAME_SUFFIX: &str = "png";
