//! Request-scoped upload models

use bytes::Bytes;

/// A single uploaded file as received from the inbound request.
///
/// Created per call and dropped once the response is assembled. The original
/// name is reduced to its last path component so a client cannot smuggle
/// directory separators into the stored name.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub bytes: Bytes,
    pub original_name: String,
    pub declared_size: u64,
    /// Lowercased extension without the leading dot; empty when the name has none.
    pub extension: String,
    pub content_type: String,
}

impl UploadRequest {
    pub fn new(
        original_name: &str,
        content_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        let bytes = bytes.into();
        let original_name = strip_directories(original_name).to_string();
        let extension = original_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_default();

        Self {
            declared_size: bytes.len() as u64,
            bytes,
            original_name,
            extension,
            content_type: content_type.into(),
        }
    }
}

/// Strips everything up to the last `/` or `\`.
pub fn strip_directories(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}

/// Returns `name` without its last extension, or `name` itself if it has none.
pub fn base_name(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((base, _)) => base,
        None => name,
    }
}

/// The name a file is stored under, plus what the pipeline needs to know about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedFile {
    pub stored_name: String,
    pub size_bytes: u64,
    pub extension: String,
}

impl NamedFile {
    pub fn new(stored_name: impl Into<String>, size_bytes: u64) -> Self {
        let stored_name = stored_name.into();
        let extension = stored_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_string())
            .unwrap_or_default();
        Self {
            stored_name,
            size_bytes,
            extension,
        }
    }
}

/// A local file waiting to be pushed to the remote static host.
#[derive(Debug, Clone)]
pub struct PendingFile {
    pub file: NamedFile,
    pub bytes: Bytes,
    pub content_type: String,
}

/// One attribute handed to the remote sync.
///
/// A pending file is uploaded; a remote URL marks a previously synced file
/// that is being cleared or replaced and is removed from the host.
#[derive(Debug, Clone)]
pub enum SyncItem {
    Pending(PendingFile),
    RemoteUrl(String),
}

/// Per-attribute result of a sync run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncResult {
    pub key: String,
    pub succeeded: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_request_extension_lowercased() {
        let req = UploadRequest::new("Photo.JPG", "image/jpeg", vec![1u8, 2, 3]);
        assert_eq!(req.extension, "jpg");
        assert_eq!(base_name(&req.original_name), "Photo");
        assert_eq!(req.declared_size, 3);
    }

    #[test]
    fn test_upload_request_strips_directories() {
        let req = UploadRequest::new("../../etc/passwd.txt", "text/plain", Vec::new());
        assert_eq!(req.original_name, "passwd.txt");

        let req = UploadRequest::new("C:\\Users\\me\\report.pdf", "application/pdf", Vec::new());
        assert_eq!(req.original_name, "report.pdf");
    }

    #[test]
    fn test_upload_request_without_extension() {
        let req = UploadRequest::new("README", "text/plain", Vec::new());
        assert_eq!(req.extension, "");
        assert_eq!(base_name(&req.original_name), "README");
    }

    #[test]
    fn test_base_name_keeps_inner_dots() {
        assert_eq!(base_name("archive.tar.gz"), "archive.tar");
    }
}
