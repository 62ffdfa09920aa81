//! Application state shared by all handlers.

use crate::services::{PostLifecycleService, UploadService};
use filepost_core::{Config, UploadValidator};
use filepost_db::PostRepository;
use filepost_storage::Storage;
use std::sync::Arc;

pub struct AppState {
    pub config: Config,
    pub repository: Arc<dyn PostRepository>,
    /// Backend selected at startup; the same instance serves uploads and deletes.
    pub storage: Arc<dyn Storage>,
    pub uploads: UploadService,
    pub posts: PostLifecycleService,
}

impl AppState {
    pub fn new(
        config: Config,
        repository: Arc<dyn PostRepository>,
        storage: Arc<dyn Storage>,
    ) -> Arc<Self> {
        let uploads = UploadService::new(storage.clone(), UploadValidator::default());
        let posts = PostLifecycleService::new(
            repository.clone(),
            storage.clone(),
            config.app_url.clone(),
            config.delete_policy,
        );

        Arc::new(Self {
            config,
            repository,
            storage,
            uploads,
            posts,
        })
    }
}
