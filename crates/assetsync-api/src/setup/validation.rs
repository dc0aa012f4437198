//! Configuration validation
//!
//! Checks critical configuration values at startup to catch misconfigurations early.

use anyhow::{Context, Result};
use assetsync_core::{Config, StorageBackend, SyncEnvironment, UploadConfig};

/// Validate critical configuration values
pub fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        return Err(anyhow::anyhow!("PORT cannot be 0"));
    }

    if config.server.max_request_body_bytes == 0 {
        return Err(anyhow::anyhow!("MAX_REQUEST_BODY_MB cannot be 0"));
    }

    validate_upload(&config.image_upload).context("Invalid image upload configuration")?;
    validate_upload(&config.file_upload).context("Invalid file upload configuration")?;

    config.sync.validate()?;

    if config.is_production() {
        if config.sync.environment != SyncEnvironment::Production {
            tracing::warn!("Production server syncing to the test static host");
        }
        if config.sync.backend == StorageBackend::Local {
            tracing::warn!("SYNC_BACKEND=local in production - files never reach the static host");
        }
        if config.sync.backend == StorageBackend::Http && config.sync.token.is_none() {
            tracing::warn!("STATIC_HOST_TOKEN not set - static host requests are unauthenticated");
        }
    }

    Ok(())
}

fn validate_upload(upload: &UploadConfig) -> Result<()> {
    if upload.destination_path.as_os_str().is_empty() {
        return Err(anyhow::anyhow!("The \"path\" attribute must be set."));
    }
    if upload.public_base_url.is_empty() {
        return Err(anyhow::anyhow!("The \"url\" attribute must be set."));
    }
    if upload.upload_param.is_empty() {
        return Err(anyhow::anyhow!("The upload parameter name must not be empty"));
    }

    upload.validator_options.validate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assetsync_core::{ServerConfig, SyncConfig, ValidatorOptions};

    fn config() -> Config {
        Config {
            server: ServerConfig {
                port: 4000,
                environment: "development".to_string(),
                max_request_body_bytes: 1024 * 1024,
                log_format: "text".to_string(),
            },
            image_upload: UploadConfig::new("/tmp/images", "http://localhost/images")
                .unwrap()
                .with_only_images(true),
            file_upload: UploadConfig::new("/tmp/files", "http://localhost/files").unwrap(),
            sync: SyncConfig::local("/tmp/static", SyncEnvironment::Test),
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(validate_config(&config()).is_ok());
    }

    #[test]
    fn test_zero_port_rejected() {
        let mut config = config();
        config.server.port = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_inconsistent_validator_options_rejected() {
        let mut config = config();
        config.file_upload.validator_options = ValidatorOptions {
            min_size: Some(10),
            max_size: Some(5),
            ..Default::default()
        };
        assert!(validate_config(&config).is_err());
    }
}
