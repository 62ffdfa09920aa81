#[cfg(feature = "storage-local")]
use crate::LocalStorage;
#[cfg(feature = "storage-s3")]
use crate::{s3::S3Credentials, S3Storage};
use crate::{Storage, StorageBackend, StorageError, StorageResult};
use filepost_core::Config;
use std::sync::Arc;

/// Create the storage backend selected by configuration
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn Storage>> {
    match config.storage_backend {
        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => {
            let bucket = config
                .bucket_name
                .clone()
                .ok_or_else(|| StorageError::ConfigError("BUCKET_NAME not configured".to_string()))?;
            let region = config.aws_region.clone().ok_or_else(|| {
                StorageError::ConfigError(
                    "AWS_DEFAULT_REGION or AWS_REGION not configured".to_string(),
                )
            })?;
            let credentials = match (&config.aws_access_key_id, &config.aws_secret_access_key) {
                (Some(id), Some(secret)) => Some(S3Credentials {
                    access_key_id: id.clone(),
                    secret_access_key: secret.clone(),
                }),
                _ => None,
            };

            let storage =
                S3Storage::new(bucket, region, config.s3_endpoint.clone(), credentials).await?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageBackend::S3 => Err(StorageError::ConfigError(
            "S3 storage backend not available (storage-s3 feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let storage = LocalStorage::new(&config.uploads_dir).await?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),
    }
}

#[cfg(all(test, feature = "storage-local"))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn creates_local_backend_in_configured_dir() {
        let dir = TempDir::new().unwrap();
        let uploads = dir.path().join("uploads");
        let uploads_str = uploads.to_string_lossy().to_string();
        let config = Config::from_lookup(|key| match key {
            "DATABASE_URL" => Some("memory://".to_string()),
            "UPLOADS_DIR" => Some(uploads_str.clone()),
            _ => None,
        })
        .unwrap();

        let storage = create_storage(&config).await.unwrap();
        assert_eq!(storage.backend_type(), StorageBackend::Local);
        assert!(uploads.is_dir());
    }
}
