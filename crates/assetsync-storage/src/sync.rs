//! Remote sync: pushes finished uploads to the static host and removes
//! files that were cleared or replaced.

use std::collections::BTreeMap;
use std::sync::Arc;

use assetsync_core::{PendingFile, SyncItem, SyncResult};
use async_trait::async_trait;

use crate::keys::{remote_key, strip_remote_host};
use crate::Storage;

/// Transport capability the upload pipeline syncs through.
///
/// Both operations report plain success; failures are logged by the
/// implementation and never retried.
#[async_trait]
pub trait RemoteSync: Send + Sync {
    /// Push a file under the configured prefix. `true` only on confirmed acceptance.
    async fn upload(&self, file: &PendingFile) -> bool;

    /// Delete a file given its path relative to the remote host.
    async fn remove(&self, path: &str) -> bool;

    /// Root URL of the remote host, ends with `/`.
    fn remote_host(&self) -> &str;

    /// Path, relative to the remote host, a file named `name` is uploaded to.
    fn remote_path(&self, name: &str) -> String;

    /// Removes a file this sync uploaded earlier.
    async fn discard(&self, file: &PendingFile) -> bool {
        self.remove(&self.remote_path(&file.file.stored_name)).await
    }

    /// Processes every attribute independently: pending files are uploaded,
    /// remote URLs are removed. A failing item does not stop its siblings.
    async fn sync(&self, items: BTreeMap<String, SyncItem>) -> Vec<SyncResult> {
        let mut results = Vec::with_capacity(items.len());

        for (key, item) in items {
            let succeeded = match &item {
                SyncItem::Pending(file) => self.upload(file).await,
                SyncItem::RemoteUrl(url) => {
                    let path = strip_remote_host(url, self.remote_host());
                    self.remove(path).await
                }
            };
            results.push(SyncResult { key, succeeded });
        }

        results
    }
}

/// [`RemoteSync`] backed by any [`Storage`].
pub struct StaticHostSync {
    storage: Arc<dyn Storage>,
    host: String,
    prefix: String,
}

impl StaticHostSync {
    pub fn new(storage: Arc<dyn Storage>, host: String, prefix: String) -> Self {
        Self {
            storage,
            host,
            prefix,
        }
    }

    /// Public URL of a synced file
    pub fn public_url(&self, name: &str) -> String {
        format!("{}{}", self.host, self.remote_path(name))
    }
}

#[async_trait]
impl RemoteSync for StaticHostSync {
    async fn upload(&self, file: &PendingFile) -> bool {
        let key = self.remote_path(&file.file.stored_name);

        match self
            .storage
            .put(&key, file.bytes.clone(), &file.content_type, true)
            .await
        {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    key = %key,
                    size_bytes = file.file.size_bytes,
                    backend = %self.storage.backend_type(),
                    "Remote sync upload failed"
                );
                false
            }
        }
    }

    async fn remove(&self, path: &str) -> bool {
        match self.storage.delete(path).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    key = %path,
                    backend = %self.storage.backend_type(),
                    "Remote sync remove failed"
                );
                false
            }
        }
    }

    fn remote_host(&self) -> &str {
        &self.host
    }

    fn remote_path(&self, name: &str) -> String {
        remote_key(&self.prefix, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LocalStorage;
    use assetsync_core::NamedFile;
    use bytes::Bytes;
    use tempfile::TempDir;

    const HOST: &str = "http://static.test.localhost/";

    async fn sync() -> (TempDir, StaticHostSync) {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path(), HOST.to_string())
            .await
            .unwrap();
        let sync = StaticHostSync::new(Arc::new(storage), HOST.to_string(), "service/".to_string());
        (dir, sync)
    }

    fn pending(name: &str) -> PendingFile {
        PendingFile {
            file: NamedFile::new(name, 3),
            bytes: Bytes::from_static(b"abc"),
            content_type: "image/png".to_string(),
        }
    }

    #[tokio::test]
    async fn test_upload_writes_under_prefix() {
        let (dir, sync) = sync().await;

        assert!(sync.upload(&pending("a1700000000.3x10.png")).await);
        assert!(dir.path().join("service/a1700000000.3x10.png").exists());
        assert_eq!(
            sync.public_url("a1700000000.3x10.png"),
            "http://static.test.localhost/service/a1700000000.3x10.png"
        );
    }

    #[tokio::test]
    async fn test_discard_removes_uploaded_file() {
        let (dir, sync) = sync().await;
        let file = pending("b1700000000.3x10.png");
        assert!(sync.upload(&file).await);

        assert!(sync.discard(&file).await);
        assert!(!dir.path().join("service/b1700000000.3x10.png").exists());
        assert!(!sync.discard(&file).await);
    }

    #[tokio::test]
    async fn test_sync_removes_by_public_url() {
        let (dir, sync) = sync().await;
        assert!(sync.upload(&pending("old.png")).await);

        let mut items = BTreeMap::new();
        items.insert(
            "avatar".to_string(),
            SyncItem::RemoteUrl(sync.public_url("old.png")),
        );

        let results = sync.sync(items).await;

        assert_eq!(
            results,
            vec![SyncResult {
                key: "avatar".to_string(),
                succeeded: true
            }]
        );
        assert!(!dir.path().join("service/old.png").exists());
    }

    #[tokio::test]
    async fn test_sync_continues_after_failed_item() {
        let (_dir, sync) = sync().await;

        let mut items = BTreeMap::new();
        items.insert(
            "a_missing".to_string(),
            SyncItem::RemoteUrl(sync.public_url("never-synced.png")),
        );
        items.insert(
            "b_foreign".to_string(),
            SyncItem::RemoteUrl("https://elsewhere.com/a.png".to_string()),
        );
        items.insert("c_new".to_string(), SyncItem::Pending(pending("new.png")));

        let results = sync.sync(items).await;

        let outcome: Vec<(&str, bool)> = results
            .iter()
            .map(|r| (r.key.as_str(), r.succeeded))
            .collect();
        assert_eq!(
            outcome,
            vec![("a_missing", false), ("b_foreign", false), ("c_new", true)]
        );
    }
}
