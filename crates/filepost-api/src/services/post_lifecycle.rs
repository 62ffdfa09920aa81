//! Record lifecycle: ties each post record to the stored object it describes.
//!
//! Keeps handler logic thin and allows unit testing without HTTP.

use filepost_core::models::{derive_public_url, NewPost, Post};
use filepost_core::{AppError, DeletePolicy, StorageBackend};
use filepost_db::PostRepository;
use filepost_storage::Storage;
use std::sync::Arc;
use uuid::Uuid;

/// Creates, lists and deletes post records together with their stored files.
#[derive(Clone)]
pub struct PostLifecycleService {
    repository: Arc<dyn PostRepository>,
    storage: Arc<dyn Storage>,
    base_url: String,
    delete_policy: DeletePolicy,
}

impl PostLifecycleService {
    pub fn new(
        repository: Arc<dyn PostRepository>,
        storage: Arc<dyn Storage>,
        base_url: impl Into<String>,
        delete_policy: DeletePolicy,
    ) -> Self {
        Self {
            repository,
            storage,
            base_url: base_url.into(),
            delete_policy,
        }
    }

    /// Record an object the backend has already stored.
    ///
    /// When the backend reported no URL, the record gets `<base>/files/<key>`.
    #[tracing::instrument(skip_all, fields(key = %key, size_bytes = size))]
    pub async fn create_record(
        &self,
        name: String,
        size: u64,
        key: String,
        url: Option<String>,
        backend: StorageBackend,
    ) -> Result<Post, AppError> {
        let size = i64::try_from(size)
            .map_err(|_| AppError::Internal(format!("File size {} out of range", size)))?;

        let url = match url {
            Some(url) if !url.is_empty() => url,
            _ => derive_public_url(&self.base_url, &key),
        };

        let post = NewPost {
            name,
            size,
            key,
            url,
            backend,
        }
        .into_post();

        let post = self.repository.insert(&post).await?;

        tracing::info!(post_id = %post.id, url = %post.url, "Post record created");

        Ok(post)
    }

    /// Delete a record and its stored object.
    ///
    /// The object delete is issued first. If it fails, `DeletePolicy` decides
    /// whether the record is removed anyway or kept for a retry.
    #[tracing::instrument(skip_all, fields(post_id = %id))]
    pub async fn delete_record(&self, id: Uuid) -> Result<(), AppError> {
        let post = self
            .repository
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

        if let Err(e) = self.delete_stored_object(&post).await {
            match self.delete_policy {
                DeletePolicy::Strict => return Err(e),
                DeletePolicy::BestEffort => {
                    tracing::error!(
                        error = %e,
                        post_id = %post.id,
                        key = %post.key,
                        "Failed to delete stored file, removing record anyway"
                    );
                }
            }
        }

        // A concurrent delete may have won the race
        if !self.repository.delete(id).await? {
            return Err(AppError::NotFound("Post not found".to_string()));
        }

        tracing::info!(post_id = %post.id, key = %post.key, "Post deleted");
        Ok(())
    }

    /// All records, re-read from the store on every call.
    pub async fn list_records(&self) -> Result<Vec<Post>, AppError> {
        self.repository.list().await
    }

    /// Remove an object whose record could not be written.
    ///
    /// Runs in the background and only logs the outcome.
    pub fn spawn_orphan_cleanup(&self, key: String) {
        let storage = self.storage.clone();
        tokio::spawn(async move {
            match storage.delete(&key).await {
                Ok(()) => tracing::info!(key = %key, "Removed stored file after metadata error"),
                Err(cleanup_err) => tracing::warn!(
                    error = %cleanup_err,
                    key = %key,
                    "Failed to cleanup stored file after metadata error"
                ),
            }
        });
    }

    async fn delete_stored_object(&self, post: &Post) -> Result<(), AppError> {
        let active = self.storage.backend_type();
        if post.backend != active {
            // Never ask the active backend to delete a key it did not issue
            tracing::warn!(
                post_id = %post.id,
                key = %post.key,
                record_backend = %post.backend,
                active_backend = %active,
                "Post was stored by a different backend than the one configured"
            );
            return Err(AppError::StorageDelete(format!(
                "post {} is stored in the {} backend but {} is configured",
                post.id, post.backend, active
            )));
        }

        self.storage
            .delete(&post.key)
            .await
            .map_err(|e| AppError::StorageDelete(e.to_string()))
    }
}
