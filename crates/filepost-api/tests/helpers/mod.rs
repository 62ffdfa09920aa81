//! Test helpers: build AppState and router for integration tests.
//!
//! Every app gets local storage in its own temp dir and the in-memory
//! metadata store, so no external services are needed.

#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use filepost_api::setup::routes;
use filepost_api::state::AppState;
use filepost_core::models::Post;
use filepost_core::{AppError, Config};
use filepost_db::{MemoryPostRepository, PostRepository};
use filepost_storage::LocalStorage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use uuid::Uuid;

pub const APP_URL: &str = "http://localhost:3000";

/// Test application: server, state, and owned resources.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub uploads_dir: PathBuf,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Names of the files currently in the uploads directory.
    pub fn stored_files(&self) -> Vec<String> {
        stored_files(&self.uploads_dir)
    }
}

pub fn stored_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("read uploads dir")
        .map(|entry| entry.expect("dir entry").file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

/// Setup test app with the in-memory store and best-effort deletes.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(Arc::new(MemoryPostRepository::new()), &[]).await
}

/// Setup test app with a custom repository and extra configuration.
pub async fn setup_test_app_with(
    repository: Arc<dyn PostRepository>,
    extra_env: &[(&str, &str)],
) -> TestApp {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let uploads_dir = temp_dir.path().join("uploads");
    let uploads_str = uploads_dir.to_string_lossy().to_string();

    let mut vars: Vec<(String, String)> = vec![
        ("DATABASE_URL".to_string(), "memory://".to_string()),
        ("APP_URL".to_string(), APP_URL.to_string()),
        ("UPLOADS_DIR".to_string(), uploads_str),
    ];
    vars.extend(extra_env.iter().map(|(k, v)| (k.to_string(), v.to_string())));

    let config = Config::from_lookup(|key| {
        vars.iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    })
    .expect("Failed to build test config");

    let storage = LocalStorage::new(&uploads_dir)
        .await
        .expect("Failed to create local storage");

    let state = AppState::new(config, repository, Arc::new(storage));
    let app = routes::setup_routes(&state.config, state.clone()).expect("Failed to setup routes");
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        state,
        uploads_dir,
        _temp_dir: temp_dir,
    }
}

/// Multipart form with one `file` part.
pub fn file_form(bytes: Vec<u8>, file_name: &str, mime_type: &str) -> MultipartForm {
    let part = Part::bytes(bytes::Bytes::from(bytes))
        .file_name(file_name.to_string())
        .mime_type(mime_type.to_string());
    MultipartForm::new().add_part("file", part)
}

/// Minimal bytes that start like a PNG; content is never decoded.
pub fn png_bytes(len: usize) -> Vec<u8> {
    let mut data = b"\x89PNG\r\n\x1a\n".to_vec();
    data.resize(len.max(data.len()), 0xAB);
    data
}

/// Repository whose writes always fail, for exercising orphan cleanup.
pub struct FailingInsertRepository;

#[async_trait]
impl PostRepository for FailingInsertRepository {
    async fn insert(&self, _post: &Post) -> Result<Post, AppError> {
        Err(AppError::MetadataStore(sqlx_pool_closed()))
    }

    async fn get(&self, _id: Uuid) -> Result<Option<Post>, AppError> {
        Ok(None)
    }

    async fn list(&self) -> Result<Vec<Post>, AppError> {
        Ok(Vec::new())
    }

    async fn delete(&self, _id: Uuid) -> Result<bool, AppError> {
        Ok(false)
    }

    async fn ping(&self) -> Result<(), AppError> {
        Err(AppError::MetadataStore(sqlx_pool_closed()))
    }
}

fn sqlx_pool_closed() -> sqlx::Error {
    sqlx::Error::PoolClosed
}
