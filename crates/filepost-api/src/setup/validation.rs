//! Configuration validation
//!
//! Validates critical configuration values at startup to catch misconfigurations early.

use anyhow::Result;
use filepost_core::{Config, StorageBackend};

/// Validate critical configuration values
///
/// Runs the config's own checks, then the ones that only matter to a running
/// server.
pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    if !(config.app_url.starts_with("http://") || config.app_url.starts_with("https://")) {
        return Err(anyhow::anyhow!(
            "APP_URL must be an absolute http(s) URL, got '{}'",
            config.app_url
        ));
    }

    if config.is_production() && config.app_url.contains("localhost") {
        tracing::warn!(
            app_url = %config.app_url,
            "APP_URL points at localhost in production - derived file URLs will not resolve for clients"
        );
    }

    if config.storage_backend == StorageBackend::Local && config.uploads_dir.trim().is_empty() {
        return Err(anyhow::anyhow!("UPLOADS_DIR cannot be empty"));
    }

    if config.base.db_timeout_seconds == 0 {
        return Err(anyhow::anyhow!("Database timeout cannot be 0"));
    }

    Ok(())
}
