//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Upload exceeds the maximum size of {limit} bytes")]
    SizeLimitExceeded { limit: u64 },

    /// The incoming byte stream itself failed (malformed or interrupted upload).
    #[error("Upload stream error: {0}")]
    Source(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Chunked body of an upload
pub type ByteStream<'a> = Pin<Box<dyn Stream<Item = Result<Bytes, StorageError>> + Send + 'a>>;

/// A file on its way into storage
pub struct IncomingFile<'a> {
    /// Name the client gave the file. Untrusted, only used to build the key.
    pub original_filename: String,
    pub content_type: String,
    pub body: ByteStream<'a>,
}

/// Result of a successful persist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub size: u64,
    /// Public address reported by the backend, if it has one of its own
    pub url: Option<String>,
}

/// Storage abstraction trait
///
/// All storage backends (S3, local filesystem) implement this trait. The backend
/// is chosen once at startup and shared as `Arc<dyn Storage>` by the upload and
/// delete paths, so a record is always removed from the same place it was
/// written to.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Consume the upload stream and durably store it under a freshly generated key.
    ///
    /// Nothing is left behind when the stream fails part way, including when it
    /// trips the size limit.
    async fn persist(&self, upload: IncomingFile<'_>) -> StorageResult<StoredObject>;

    /// Delete a file by its storage key
    async fn delete(&self, storage_key: &str) -> StorageResult<()>;

    /// Download a file by its storage key
    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>>;

    /// Check if a file exists
    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
