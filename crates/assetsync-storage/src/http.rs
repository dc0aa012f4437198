//! Remote static asset host reached over plain HTTP.
//!
//! Objects are written with `PUT {host}{key}`, removed with `DELETE` and
//! probed with `HEAD`. Any 2xx status counts as acceptance.

use crate::keys::validate_key;
use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder, StatusCode};
use std::time::Duration;

#[derive(Clone)]
pub struct HttpStaticStorage {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpStaticStorage {
    /// # Arguments
    /// * `base_url` - Host root, e.g. "https://static.example.com/"
    /// * `token` - Optional bearer token sent with every request
    /// * `timeout` - Per-request timeout; the pipeline never retries
    pub fn new(base_url: String, token: Option<String>, timeout: Duration) -> StorageResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StorageError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl Storage for HttpStaticStorage {
    async fn put(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
        overwrite: bool,
    ) -> StorageResult<String> {
        validate_key(key)?;

        if !overwrite && self.exists(key).await? {
            return Err(StorageError::AlreadyExists(key.to_string()));
        }

        let url = self.url_for(key);
        let size = data.len();
        let start = std::time::Instant::now();

        let response = self
            .authorize(self.client.put(&url))
            .header(CONTENT_TYPE, content_type)
            .body(data)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    key = %key,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Static host upload failed"
                );
                StorageError::UploadFailed(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(
                status = status.as_u16(),
                key = %key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Static host rejected upload"
            );
            return Err(StorageError::UploadFailed(format!(
                "Static host answered {}",
                status
            )));
        }

        tracing::info!(
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Static host upload successful"
        );

        Ok(url)
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        validate_key(key)?;

        let start = std::time::Instant::now();
        let response = self
            .authorize(self.client.delete(self.url_for(key)))
            .send()
            .await
            .map_err(|e| StorageError::DeleteFailed(e.to_string()))?;

        match response.status() {
            status if status.is_success() => {
                tracing::info!(
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Static host delete successful"
                );
                Ok(())
            }
            StatusCode::NOT_FOUND => Err(StorageError::NotFound(key.to_string())),
            status => {
                tracing::error!(
                    status = status.as_u16(),
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Static host delete failed"
                );
                Err(StorageError::DeleteFailed(format!(
                    "Static host answered {}",
                    status
                )))
            }
        }
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        validate_key(key)?;

        let response = self
            .authorize(self.client.head(self.url_for(key)))
            .send()
            .await
            .map_err(|e| StorageError::BackendError(e.to_string()))?;

        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(StorageError::BackendError(format!(
                "Static host answered {} to HEAD",
                status
            ))),
        }
    }

    fn url_for(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Http
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage(server: &mockito::ServerGuard, token: Option<&str>) -> HttpStaticStorage {
        HttpStaticStorage::new(
            format!("{}/", server.url()),
            token.map(String::from),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_put_success_returns_public_url() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/service/a1700000000.3x100.png")
            .match_header("content-type", "image/png")
            .match_header("authorization", "Bearer secret")
            .match_body("abc")
            .with_status(201)
            .create_async()
            .await;

        let url = storage(&server, Some("secret"))
            .put(
                "service/a1700000000.3x100.png",
                Bytes::from_static(b"abc"),
                "image/png",
                true,
            )
            .await
            .unwrap();

        assert_eq!(url, format!("{}/service/a1700000000.3x100.png", server.url()));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_put_rejected_status_is_upload_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("PUT", "/service/a.png")
            .with_status(500)
            .create_async()
            .await;

        let err = storage(&server, None)
            .put("service/a.png", Bytes::from_static(b"abc"), "image/png", true)
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::UploadFailed(_)));
    }

    #[tokio::test]
    async fn test_put_without_overwrite_checks_existence() {
        let mut server = mockito::Server::new_async().await;
        let _head = server
            .mock("HEAD", "/service/a.png")
            .with_status(200)
            .create_async()
            .await;
        let put = server
            .mock("PUT", "/service/a.png")
            .expect(0)
            .create_async()
            .await;

        let err = storage(&server, None)
            .put("service/a.png", Bytes::from_static(b"abc"), "image/png", false)
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::AlreadyExists(_)));
        put.assert_async().await;
    }

    #[tokio::test]
    async fn test_exists_maps_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("HEAD", "/service/missing.png")
            .with_status(404)
            .create_async()
            .await;

        assert!(!storage(&server, None)
            .exists("service/missing.png")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_delete() {
        let mut server = mockito::Server::new_async().await;
        let ok = server
            .mock("DELETE", "/service/a.png")
            .with_status(204)
            .create_async()
            .await;
        let _missing = server
            .mock("DELETE", "/service/b.png")
            .with_status(404)
            .create_async()
            .await;

        let storage = storage(&server, None);
        storage.delete("service/a.png").await.unwrap();
        ok.assert_async().await;

        let err = storage.delete("service/b.png").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }
}
