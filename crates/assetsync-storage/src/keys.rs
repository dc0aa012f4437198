//! Key helpers shared by the storage backends and the remote sync.

use crate::{StorageError, StorageResult};

/// Key of a synced file on the remote host: `{prefix}{name}`.
pub fn remote_key(prefix: &str, name: &str) -> String {
    format!("{}{}", prefix, name)
}

/// Turns a public URL into a path relative to `host`.
///
/// URLs that do not start with `host` are returned unchanged and later fail
/// [`validate_key`].
pub fn strip_remote_host<'a>(url: &'a str, host: &str) -> &'a str {
    url.strip_prefix(host).unwrap_or(url)
}

/// Rejects keys that could escape the storage root.
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("Storage key is empty".to_string()));
    }
    if key.starts_with('/') || key.contains('\\') || key.contains("://") {
        return Err(StorageError::InvalidKey(
            "Storage key contains invalid characters".to_string(),
        ));
    }
    if key.split('/').any(|segment| segment == ".." || segment == ".") {
        return Err(StorageError::InvalidKey(
            "Storage key contains relative path segments".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_key_uses_prefix() {
        assert_eq!(remote_key("service/", "a1700000000.5x10.png"), "service/a1700000000.5x10.png");
        assert_eq!(remote_key("", "a.png"), "a.png");
    }

    #[test]
    fn test_strip_remote_host() {
        let host = "https://static.test.example.com/";
        assert_eq!(
            strip_remote_host("https://static.test.example.com/service/a.png", host),
            "service/a.png"
        );
        assert_eq!(
            strip_remote_host("https://elsewhere.com/service/a.png", host),
            "https://elsewhere.com/service/a.png"
        );
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key("service/a.png").is_ok());
        assert!(validate_key("../etc/passwd").is_err());
        assert!(validate_key("service/../a.png").is_err());
        assert!(validate_key("./a.png").is_err());
        assert!(validate_key("/abs").is_err());
        assert!(validate_key("").is_err());
        assert!(validate_key("https://elsewhere.com/a.png").is_err());
    }

    #[test]
    fn test_validate_key_allows_dots_inside_names() {
        assert!(validate_key("holiday..final.pdf").is_ok());
        assert!(validate_key("service/holiday..final1700000000.5x10.png").is_ok());
        assert!(validate_key("...").is_ok());
    }
}
