//! Filepost Database Library
//!
//! Metadata store for upload records: a PostgreSQL repository for deployments
//! and an in-memory one for development and tests.

pub mod db;

pub use db::{MemoryPostRepository, PgPostRepository, PostRepository};
