use crate::keys::generate_storage_key;
use crate::traits::{IncomingFile, Storage, StorageError, StorageResult, StoredObject};
use crate::StorageBackend;
use async_trait::async_trait;
use futures::StreamExt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem storage implementation
///
/// Files live directly under `base_path`, one file per key. The backend has no
/// public URL of its own; the API serves the directory under `/files`.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage instance, creating `base_path` if needed
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Convert storage key to filesystem path
    ///
    /// Keys are single path segments, so anything that could name another
    /// directory is refused before touching the filesystem.
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        if storage_key.is_empty()
            || storage_key.contains("..")
            || storage_key.starts_with('/')
            || storage_key.contains('/')
            || storage_key.contains('\\')
            || storage_key.contains('\0')
        {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }

        Ok(self.base_path.join(storage_key))
    }
}

/// Removes a file that was only partially written.
///
/// Runs on drop so a persist future that is cancelled mid-stream cleans up too.
struct PartialFile {
    path: Option<PathBuf>,
}

impl PartialFile {
    fn new(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    fn keep(mut self) {
        self.path = None;
    }
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            match std::fs::remove_file(&path) {
                Ok(()) => tracing::debug!(path = %path.display(), "Removed partial upload"),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => tracing::warn!(
                    error = %e,
                    path = %path.display(),
                    "Failed to remove partial upload"
                ),
            }
        }
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn persist(&self, upload: IncomingFile<'_>) -> StorageResult<StoredObject> {
        let IncomingFile {
            original_filename,
            content_type,
            mut body,
        } = upload;

        let key = generate_storage_key(&original_filename);
        let path = self.key_to_path(&key)?;
        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;
        let partial = PartialFile::new(path.clone());

        let mut size: u64 = 0;
        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await.map_err(|e| {
                StorageError::WriteFailed(format!(
                    "Failed to write file {}: {}",
                    path.display(),
                    e
                ))
            })?;
            size += chunk.len() as u64;
        }

        file.flush().await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to flush file {}: {}", path.display(), e))
        })?;
        file.sync_all().await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;
        partial.keep();

        tracing::info!(
            path = %path.display(),
            key = %key,
            content_type = %content_type,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage write successful"
        );

        Ok(StoredObject {
            key,
            size,
            url: None,
        })
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        let path = self.key_to_path(storage_key)?;
        let start = std::time::Instant::now();

        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(
                    path = %path.display(),
                    key = %storage_key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Local storage delete successful"
                );
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(key = %storage_key, "Local file already absent, nothing to delete");
                Ok(())
            }
            Err(e) => Err(StorageError::DeleteFailed(format!(
                "Failed to delete file {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        let path = self.key_to_path(storage_key)?;

        match fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StorageError::NotFound(storage_key.to_string()))
            }
            Err(e) => Err(StorageError::BackendError(format!(
                "Failed to read file {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(storage_key)?;
        Ok(fs::try_exists(&path).await?)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limit::enforce_size_limit;
    use crate::traits::ByteStream;
    use bytes::Bytes;
    use futures::stream;
    use std::time::Duration;
    use tempfile::TempDir;

    fn body(chunks: Vec<&'static [u8]>) -> ByteStream<'static> {
        Box::pin(stream::iter(
            chunks
                .into_iter()
                .map(|c| Ok::<_, StorageError>(Bytes::from_static(c))),
        ))
    }

    fn incoming(name: &str, body: ByteStream<'static>) -> IncomingFile<'static> {
        IncomingFile {
            original_filename: name.to_string(),
            content_type: "image/png".to_string(),
            body,
        }
    }

    async fn file_count(dir: &Path) -> usize {
        let mut entries = fs::read_dir(dir).await.unwrap();
        let mut count = 0;
        while entries.next_entry().await.unwrap().is_some() {
            count += 1;
        }
        count
    }

    #[tokio::test]
    async fn persist_streams_chunks_to_disk() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        let stored = storage
            .persist(incoming("cat.png", body(vec![b"\x89PNG", b"rest"])))
            .await
            .unwrap();

        assert!(stored.key.ends_with("-cat.png"));
        assert_eq!(stored.size, 8);
        assert!(stored.url.is_none());
        assert_eq!(storage.download(&stored.key).await.unwrap(), b"\x89PNGrest");
        assert!(dir.path().join(&stored.key).exists());
    }

    #[tokio::test]
    async fn oversize_stream_leaves_nothing_behind() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        let limited = enforce_size_limit(body(vec![b"12345", b"67890", b"x"]), 10);
        let err = storage.persist(incoming("big.png", limited)).await.unwrap_err();

        assert!(matches!(err, StorageError::SizeLimitExceeded { limit: 10 }));
        assert_eq!(file_count(dir.path()).await, 0);
    }

    #[tokio::test]
    async fn failed_source_removes_partial_file() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        let items: Vec<Result<Bytes, StorageError>> = vec![
            Ok(Bytes::from_static(b"partial")),
            Err(StorageError::Source("client went away".to_string())),
        ];
        let err = storage
            .persist(incoming("cut.gif", Box::pin(stream::iter(items))))
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::Source(_)));
        assert_eq!(file_count(dir.path()).await, 0);
    }

    #[tokio::test]
    async fn cancelled_persist_removes_partial_file() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        let stalled: ByteStream<'static> = Box::pin(
            stream::iter(vec![Ok::<_, StorageError>(Bytes::from_static(b"first chunk"))])
                .chain(stream::pending()),
        );
        let result = tokio::time::timeout(
            Duration::from_millis(50),
            storage.persist(incoming("slow.jpg", stalled)),
        )
        .await;

        assert!(result.is_err());
        assert_eq!(file_count(dir.path()).await, 0);
    }

    #[tokio::test]
    async fn delete_removes_file_and_tolerates_missing() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        let stored = storage
            .persist(incoming("cat.png", body(vec![b"data"])))
            .await
            .unwrap();
        assert!(storage.exists(&stored.key).await.unwrap());

        storage.delete(&stored.key).await.unwrap();
        assert!(!storage.exists(&stored.key).await.unwrap());
        assert!(matches!(
            storage.download(&stored.key).await,
            Err(StorageError::NotFound(_))
        ));

        // Second delete is a no-op
        storage.delete(&stored.key).await.unwrap();
    }

    #[tokio::test]
    async fn rejects_keys_outside_the_directory() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        for key in ["../secret", "/etc/passwd", "a/b.png", "a\\b.png", ""] {
            assert!(matches!(
                storage.delete(key).await,
                Err(StorageError::InvalidKey(_))
            ));
            assert!(matches!(
                storage.download(key).await,
                Err(StorageError::InvalidKey(_))
            ));
        }
    }

    #[tokio::test]
    async fn new_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("tmp").join("uploads");
        let storage = LocalStorage::new(&nested).await.unwrap();
        assert!(nested.is_dir());
        assert_eq!(storage.base_path(), nested.as_path());
        assert_eq!(storage.backend_type(), StorageBackend::Local);
    }
}
