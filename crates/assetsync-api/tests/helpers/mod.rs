//! Test helpers: build AppState and router for integration tests.
//!
//! Every app gets its own temp directory holding both upload destinations
//! and, for the local sync backend, the stand-in static host.
//!
//! Run from workspace root: `cargo test -p assetsync-api`.

#![allow(dead_code)]

pub mod fixtures;

use assetsync_api::setup::{routes, services, storage};
use assetsync_core::{
    Config, PendingFile, ServerConfig, SyncConfig, SyncEnvironment, UploadConfig,
};
use assetsync_storage::RemoteSync;
use async_trait::async_trait;
use axum_test::TestServer;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

pub const IMAGE_URL: &str = "http://cdn.example.com/images/";
pub const FILE_URL: &str = "http://cdn.example.com/files/";
pub const REMOTE_HOST: &str = "http://static.test.localhost/";

/// Test application: server plus the directories it writes into.
pub struct TestApp {
    pub server: TestServer,
    pub config: Config,
    pub temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn image_dir(&self) -> &Path {
        &self.config.image_upload.destination_path
    }

    pub fn file_dir(&self) -> &Path {
        &self.config.file_upload.destination_path
    }

    /// Directory the local sync backend writes remote files into
    pub fn remote_dir(&self) -> PathBuf {
        self.temp_dir.path().join("static").join("service")
    }

    /// Names of the files synced to the stand-in static host
    pub fn remote_files(&self) -> Vec<String> {
        list_files(&self.remote_dir())
    }
}

pub fn list_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(Result::ok)
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect(),
        Err(_) => Vec::new(),
    };
    names.sort();
    names
}

pub fn test_config(root: &Path) -> Config {
    Config {
        server: ServerConfig {
            port: 4000,
            environment: "test".to_string(),
            max_request_body_bytes: 5 * 1024 * 1024,
            log_format: "text".to_string(),
        },
        image_upload: UploadConfig::new(root.join("images"), IMAGE_URL)
            .unwrap()
            .with_only_images(true),
        file_upload: UploadConfig::new(root.join("files"), FILE_URL).unwrap(),
        sync: SyncConfig::local(root.join("static"), SyncEnvironment::Test),
    }
}

/// Setup a test app syncing to a local directory.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(|config| config).await
}

/// Setup a test app after adjusting the default test configuration.
pub async fn setup_test_app_with(adjust: impl FnOnce(Config) -> Config) -> TestApp {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = adjust(test_config(temp_dir.path()));

    let remote_sync = storage::setup_remote_sync(&config.sync)
        .await
        .expect("Failed to set up remote sync");

    build_app(temp_dir, config, remote_sync).await
}

/// Setup a test app whose remote sync refuses every upload.
pub async fn setup_test_app_with_failing_sync() -> TestApp {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = test_config(temp_dir.path());

    build_app(temp_dir, config, Arc::new(RefusingSync)).await
}

async fn build_app(temp_dir: TempDir, config: Config, remote_sync: Arc<dyn RemoteSync>) -> TestApp {
    let state = services::initialize_services(&config, remote_sync)
        .await
        .expect("Failed to initialize services");
    let app = routes::setup_routes(&config, state)
        .await
        .expect("Failed to set up routes");

    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        config,
        temp_dir: temp_dir,
    }
}

/// Static host that is never reachable
struct RefusingSync;

#[async_trait]
impl RemoteSync for RefusingSync {
    async fn upload(&self, _file: &PendingFile) -> bool {
        false
    }

    async fn remove(&self, _path: &str) -> bool {
        false
    }

    fn remote_host(&self) -> &str {
        REMOTE_HOST
    }

    fn remote_path(&self, name: &str) -> String {
        format!("service/{}", name)
    }
}
