//! Filepost Storage Library
//!
//! Storage abstraction for uploaded files, with implementations for the local
//! filesystem and S3-compatible object storage.
//!
//! # Storage key format
//!
//! Every stored object gets a key of the form `{hex(16 random bytes)}-{filename}`
//! where `filename` is the client's original name reduced to `[A-Za-z0-9._-]`.
//! Keys are always a single path segment and never contain `..`. Key generation
//! is centralized in the `keys` module so both backends stay consistent.

pub mod factory;
pub mod keys;
pub mod limit;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use filepost_core::StorageBackend;
pub use keys::generate_storage_key;
pub use limit::enforce_size_limit;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{ByteStream, IncomingFile, Storage, StorageError, StorageResult, StoredObject};
