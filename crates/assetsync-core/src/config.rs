//! Configuration module
//!
//! Everything is read from the environment once at startup (a `.env` file is
//! loaded first when present) and is immutable afterwards. Two upload
//! endpoints are configured independently through the `IMAGE_UPLOAD_` and
//! `FILE_UPLOAD_` prefixes; the remote static host is shared.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::{DEFAULT_SYNC_MAX_SIZE, DEFAULT_SYNC_PREFIX, DEFAULT_UPLOAD_PARAM};
use crate::storage_types::StorageBackend;

const DEFAULT_PORT: u16 = 4000;
const MAX_REQUEST_BODY_MB: usize = 20;
const STATIC_HOST_TIMEOUT_SECS: u64 = 30;

/// HTTP server settings
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub port: u16,
    pub environment: String,
    pub max_request_body_bytes: usize,
    /// `json` switches the log output to JSON lines, anything else is plain text.
    pub log_format: String,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let max_request_body_mb = env::var("MAX_REQUEST_BODY_MB")
            .unwrap_or_else(|_| MAX_REQUEST_BODY_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_REQUEST_BODY_MB);

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment,
            max_request_body_bytes: max_request_body_mb * 1024 * 1024,
            log_format: env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string()),
        })
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_environment(&self.environment)
    }
}

fn is_production_environment(environment: &str) -> bool {
    let environment = environment.to_lowercase();
    environment == "production" || environment == "prod"
}

/// Constraints applied by the validator of one endpoint.
///
/// Parsed from a JSON object with camelCase keys. Unknown keys are rejected so
/// that a typo in the configuration fails at startup instead of silently
/// disabling a rule.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ValidatorOptions {
    #[serde(default)]
    pub max_size: Option<u64>,
    #[serde(default)]
    pub min_size: Option<u64>,
    /// Allowed extensions, lowercase without the dot. Empty means any.
    #[serde(default, deserialize_with = "list_or_csv")]
    pub extensions: Vec<String>,
    /// Allowed MIME types. Empty means any.
    #[serde(default, deserialize_with = "list_or_csv")]
    pub mime_types: Vec<String>,
    #[serde(default)]
    pub max_width: Option<u32>,
    #[serde(default)]
    pub max_height: Option<u32>,
    #[serde(default)]
    pub min_width: Option<u32>,
    #[serde(default)]
    pub min_height: Option<u32>,
}

/// Accepts either `["png", "jpg"]` or `"png, jpg"`.
fn list_or_csv<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ListOrCsv {
        List(Vec<String>),
        Csv(String),
    }

    let items = match ListOrCsv::deserialize(deserializer)? {
        ListOrCsv::List(items) => items,
        ListOrCsv::Csv(csv) => csv.split(',').map(str::to_string).collect(),
    };

    Ok(items
        .into_iter()
        .map(|s| s.trim().trim_start_matches('.').to_lowercase())
        .filter(|s| !s.is_empty())
        .collect())
}

impl ValidatorOptions {
    pub fn from_json(raw: &str) -> Result<Self, anyhow::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(raw)
            .map_err(|e| anyhow::anyhow!("Invalid validator options: {}", e))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if let (Some(min), Some(max)) = (self.min_size, self.max_size) {
            if min > max {
                return Err(anyhow::anyhow!(
                    "minSize ({}) must not exceed maxSize ({})",
                    min,
                    max
                ));
            }
        }
        if let (Some(min), Some(max)) = (self.min_width, self.max_width) {
            if min > max {
                return Err(anyhow::anyhow!(
                    "minWidth ({}) must not exceed maxWidth ({})",
                    min,
                    max
                ));
            }
        }
        if let (Some(min), Some(max)) = (self.min_height, self.max_height) {
            if min > max {
                return Err(anyhow::anyhow!(
                    "minHeight ({}) must not exceed maxHeight ({})",
                    min,
                    max
                ));
            }
        }
        Ok(())
    }
}

/// Settings of a single upload endpoint.
#[derive(Clone, Debug)]
pub struct UploadConfig {
    pub destination_path: PathBuf,
    /// Always ends with exactly one `/`.
    pub public_base_url: String,
    pub upload_param: String,
    pub only_images: bool,
    pub unique_names: bool,
    pub translit: bool,
    pub allow_replace: bool,
    pub validator_options: ValidatorOptions,
}

impl UploadConfig {
    /// Builds an endpoint configuration with default flags
    /// (`unique` on, `translit` and `replace` off, generic files).
    pub fn new(
        destination_path: impl Into<PathBuf>,
        public_base_url: &str,
    ) -> Result<Self, anyhow::Error> {
        let destination_path = destination_path.into();
        if destination_path.as_os_str().is_empty() {
            return Err(anyhow::anyhow!("The \"path\" attribute must be set."));
        }
        if public_base_url.trim().is_empty() {
            return Err(anyhow::anyhow!("The \"url\" attribute must be set."));
        }

        Ok(Self {
            destination_path,
            public_base_url: normalize_base_url(public_base_url),
            upload_param: DEFAULT_UPLOAD_PARAM.to_string(),
            only_images: false,
            unique_names: true,
            translit: false,
            allow_replace: false,
            validator_options: ValidatorOptions::default(),
        })
    }

    /// Reads `<PREFIX>PATH`, `<PREFIX>URL`, `<PREFIX>PARAM`, `<PREFIX>REPLACE`,
    /// `<PREFIX>UNIQUE`, `<PREFIX>TRANSLIT` and `<PREFIX>VALIDATOR_OPTIONS`.
    /// Path and URL fall back to `UPLOAD_PATH` / `UPLOAD_URL`.
    pub fn from_env(prefix: &str, only_images: bool) -> Result<Self, anyhow::Error> {
        let var = |name: &str| env::var(format!("{}{}", prefix, name));

        let path = var("PATH")
            .or_else(|_| env::var("UPLOAD_PATH"))
            .map_err(|_| {
                anyhow::anyhow!("The \"path\" attribute must be set ({}PATH or UPLOAD_PATH).", prefix)
            })?;
        let url = var("URL")
            .or_else(|_| env::var("UPLOAD_URL"))
            .map_err(|_| {
                anyhow::anyhow!("The \"url\" attribute must be set ({}URL or UPLOAD_URL).", prefix)
            })?;

        let mut config = Self::new(path, &url)?;
        config.only_images = only_images;
        config.upload_param = var("PARAM").unwrap_or_else(|_| DEFAULT_UPLOAD_PARAM.to_string());
        config.allow_replace = parse_flag(var("REPLACE").ok(), false);
        config.unique_names = parse_flag(var("UNIQUE").ok(), true);
        config.translit = parse_flag(var("TRANSLIT").ok(), false);
        config.validator_options =
            ValidatorOptions::from_json(&var("VALIDATOR_OPTIONS").unwrap_or_default())?;

        Ok(config)
    }

    pub fn with_only_images(mut self, only_images: bool) -> Self {
        self.only_images = only_images;
        self
    }

    pub fn with_unique_names(mut self, unique_names: bool) -> Self {
        self.unique_names = unique_names;
        self
    }

    pub fn with_translit(mut self, translit: bool) -> Self {
        self.translit = translit;
        self
    }

    pub fn with_allow_replace(mut self, allow_replace: bool) -> Self {
        self.allow_replace = allow_replace;
        self
    }

    pub fn with_validator_options(mut self, options: ValidatorOptions) -> Self {
        self.validator_options = options;
        self
    }

    /// Public link of a stored file.
    pub fn public_link(&self, stored_name: &str) -> String {
        format!("{}{}", self.public_base_url, stored_name)
    }
}

fn normalize_base_url(url: &str) -> String {
    format!("{}/", url.trim().trim_end_matches('/'))
}

fn parse_flag(value: Option<String>, default: bool) -> bool {
    match value.map(|v| v.trim().to_lowercase()) {
        Some(v) if v == "1" || v == "true" || v == "yes" || v == "on" => true,
        Some(v) if v == "0" || v == "false" || v == "no" || v == "off" => false,
        _ => default,
    }
}

/// Selects the remote host label.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncEnvironment {
    Production,
    Test,
}

impl SyncEnvironment {
    fn host_label(&self) -> &'static str {
        match self {
            SyncEnvironment::Production => "",
            SyncEnvironment::Test => "test.",
        }
    }
}

/// Extension given to remote (fingerprint) names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum RemoteSuffix {
    /// Always `.png`, whatever the uploaded type.
    #[default]
    Png,
    /// The extension of the public name.
    Keep,
}

impl FromStr for RemoteSuffix {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "png" => Ok(RemoteSuffix::Png),
            "keep" => Ok(RemoteSuffix::Keep),
            other => Err(anyhow::anyhow!(
                "Invalid SYNC_REMOTE_SUFFIX: {} (expected png or keep)",
                other
            )),
        }
    }
}

impl fmt::Display for RemoteSuffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteSuffix::Png => write!(f, "png"),
            RemoteSuffix::Keep => write!(f, "keep"),
        }
    }
}

/// Remote static host settings
#[derive(Clone, Debug)]
pub struct SyncConfig {
    pub backend: StorageBackend,
    pub environment: SyncEnvironment,
    pub protocol: String,
    pub domain: String,
    pub token: Option<String>,
    pub timeout_secs: u64,
    /// Sub-path every synced file is stored under, ends with `/`.
    pub prefix: String,
    /// Max size encoded into remote names; falls back to the endpoint's `maxSize`.
    pub max_size: Option<u64>,
    pub remote_suffix: RemoteSuffix,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>,
    pub local_path: Option<PathBuf>,
}

impl SyncConfig {
    pub fn from_env(is_production: bool) -> Result<Self, anyhow::Error> {
        let backend = env::var("SYNC_BACKEND")
            .ok()
            .map(|s| s.parse::<StorageBackend>())
            .transpose()?
            .unwrap_or(StorageBackend::Http);

        let domain = match env::var("STATIC_HOST_DOMAIN") {
            Ok(domain) => domain,
            Err(_) if backend == StorageBackend::Http => {
                return Err(anyhow::anyhow!(
                    "STATIC_HOST_DOMAIN must be set when SYNC_BACKEND=http"
                ));
            }
            Err(_) => "localhost".to_string(),
        };

        let remote_suffix = env::var("SYNC_REMOTE_SUFFIX")
            .ok()
            .map(|s| s.parse::<RemoteSuffix>())
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            backend,
            environment: if is_production {
                SyncEnvironment::Production
            } else {
                SyncEnvironment::Test
            },
            protocol: env::var("STATIC_HOST_PROTOCOL").unwrap_or_else(|_| "https".to_string()),
            domain,
            token: env::var("STATIC_HOST_TOKEN").ok().filter(|t| !t.is_empty()),
            timeout_secs: env::var("STATIC_HOST_TIMEOUT_SECS")
                .unwrap_or_else(|_| STATIC_HOST_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(STATIC_HOST_TIMEOUT_SECS),
            prefix: normalize_prefix(
                &env::var("SYNC_PREFIX").unwrap_or_else(|_| DEFAULT_SYNC_PREFIX.to_string()),
            ),
            max_size: env::var("SYNC_MAX_SIZE").ok().and_then(|s| s.parse().ok()),
            remote_suffix,
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION").or_else(|_| env::var("AWS_REGION")).ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            local_path: env::var("SYNC_LOCAL_PATH").ok().map(PathBuf::from),
        })
    }

    /// Settings for a local directory standing in for the remote host.
    pub fn local(path: impl Into<PathBuf>, environment: SyncEnvironment) -> Self {
        Self {
            backend: StorageBackend::Local,
            environment,
            protocol: "http".to_string(),
            domain: "localhost".to_string(),
            token: None,
            timeout_secs: STATIC_HOST_TIMEOUT_SECS,
            prefix: DEFAULT_SYNC_PREFIX.to_string(),
            max_size: None,
            remote_suffix: RemoteSuffix::default(),
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            local_path: Some(path.into()),
        }
    }

    /// `<protocol>://static.<domain>/` in production, `<protocol>://static.test.<domain>/` otherwise.
    pub fn remote_host(&self) -> String {
        format!(
            "{}://static.{}{}/",
            self.protocol,
            self.environment.host_label(),
            self.domain.trim_end_matches('/')
        )
    }

    /// Max size encoded into the remote names of one endpoint
    pub fn max_size_for(&self, options: &ValidatorOptions) -> u64 {
        self.max_size
            .or(options.max_size)
            .unwrap_or(DEFAULT_SYNC_MAX_SIZE)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.protocol.is_empty() || self.domain.is_empty() {
            return Err(anyhow::anyhow!(
                "STATIC_HOST_PROTOCOL and STATIC_HOST_DOMAIN must not be empty"
            ));
        }
        match self.backend {
            StorageBackend::S3 if self.s3_bucket.is_none() => Err(anyhow::anyhow!(
                "S3_BUCKET must be set when SYNC_BACKEND=s3"
            )),
            StorageBackend::Local if self.local_path.is_none() => Err(anyhow::anyhow!(
                "SYNC_LOCAL_PATH must be set when SYNC_BACKEND=local"
            )),
            _ => Ok(()),
        }
    }
}

fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{}/", trimmed)
    }
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub image_upload: UploadConfig,
    pub file_upload: UploadConfig,
    pub sync: SyncConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let server = ServerConfig::from_env()?;
        let sync = SyncConfig::from_env(server.is_production())?;

        Ok(Self {
            image_upload: UploadConfig::from_env("IMAGE_UPLOAD_", true)?,
            file_upload: UploadConfig::from_env("FILE_UPLOAD_", false)?,
            server,
            sync,
        })
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }

    pub fn server_port(&self) -> u16 {
        self.server.port
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_config_normalizes_trailing_slash() {
        let config = UploadConfig::new("/tmp/uploads", "https://cdn.example.com/files//").unwrap();
        assert_eq!(config.public_base_url, "https://cdn.example.com/files/");

        let config = UploadConfig::new("/tmp/uploads", "https://cdn.example.com/files").unwrap();
        assert_eq!(config.public_link("a.jpg"), "https://cdn.example.com/files/a.jpg");
    }

    #[test]
    fn test_upload_config_defaults() {
        let config = UploadConfig::new("/tmp/uploads", "http://x").unwrap();
        assert_eq!(config.upload_param, "file");
        assert!(config.unique_names);
        assert!(!config.translit);
        assert!(!config.allow_replace);
        assert!(!config.only_images);
    }

    #[test]
    fn test_upload_config_requires_url_and_path() {
        let err = UploadConfig::new("/tmp/uploads", "  ").unwrap_err();
        assert!(err.to_string().contains("\"url\""));

        let err = UploadConfig::new("", "http://x").unwrap_err();
        assert!(err.to_string().contains("\"path\""));
    }

    #[test]
    fn test_validator_options_camel_case() {
        let options =
            ValidatorOptions::from_json(r#"{"maxSize": 100000, "extensions": "png, .JPG"}"#)
                .unwrap();
        assert_eq!(options.max_size, Some(100_000));
        assert_eq!(options.extensions, vec!["png", "jpg"]);
        assert!(options.mime_types.is_empty());
    }

    #[test]
    fn test_validator_options_rejects_unknown_keys() {
        assert!(ValidatorOptions::from_json(r#"{"maxSzie": 10}"#).is_err());
    }

    #[test]
    fn test_validator_options_empty_input() {
        assert_eq!(
            ValidatorOptions::from_json("").unwrap(),
            ValidatorOptions::default()
        );
    }

    #[test]
    fn test_validator_options_min_over_max() {
        let options = ValidatorOptions {
            min_size: Some(10),
            max_size: Some(5),
            ..Default::default()
        };
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_remote_host_by_environment() {
        let mut sync = SyncConfig::local("/tmp/remote", SyncEnvironment::Production);
        sync.protocol = "https".to_string();
        sync.domain = "example.com".to_string();
        assert_eq!(sync.remote_host(), "https://static.example.com/");

        sync.environment = SyncEnvironment::Test;
        assert_eq!(sync.remote_host(), "https://static.test.example.com/");
    }

    #[test]
    fn test_max_size_fallbacks() {
        let mut sync = SyncConfig::local("/tmp/remote", SyncEnvironment::Test);
        let options = ValidatorOptions {
            max_size: Some(100_000),
            ..Default::default()
        };

        assert_eq!(sync.max_size_for(&options), 100_000);
        assert_eq!(
            sync.max_size_for(&ValidatorOptions::default()),
            DEFAULT_SYNC_MAX_SIZE
        );

        sync.max_size = Some(2048);
        assert_eq!(sync.max_size_for(&options), 2048);
    }

    #[test]
    fn test_remote_suffix_from_str() {
        assert_eq!("PNG".parse::<RemoteSuffix>().unwrap(), RemoteSuffix::Png);
        assert_eq!("keep".parse::<RemoteSuffix>().unwrap(), RemoteSuffix::Keep);
        assert!("jpg".parse::<RemoteSuffix>().is_err());
    }

    #[test]
    fn test_normalize_prefix() {
        assert_eq!(normalize_prefix("service"), "service/");
        assert_eq!(normalize_prefix("/service/"), "service/");
        assert_eq!(normalize_prefix(""), "");
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag(Some("TRUE".to_string()), false));
        assert!(!parse_flag(Some("0".to_string()), true));
        assert!(parse_flag(None, true));
        assert!(!parse_flag(Some("maybe".to_string()), false));
    }

    #[test]
    fn test_is_production_environment() {
        assert!(is_production_environment("Production"));
        assert!(is_production_environment("prod"));
        assert!(!is_production_environment("staging"));
    }
}
