use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use filepost_core::models::Post;
use filepost_core::AppError;
use std::sync::Arc;

/// Upload a single file and create its record
///
/// The bytes are stored first; the record is written only once the backend has
/// confirmed the key. If the record cannot be written the stored file is
/// removed in the background.
///
/// # Errors
/// - `AppError::InvalidInput` - not a multipart body, or no `file` field
/// - `AppError::InvalidFileType` - content type outside the allow-list
/// - `AppError::FileTooLarge` - more than 3 MiB
/// - `AppError::StorageWrite` / `AppError::MetadataStore` - backend or store failure
#[tracing::instrument(skip(state, multipart), fields(operation = "upload_post"))]
pub async fn upload_post(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Post>, HttpAppError> {
    let multipart = multipart.map_err(|e| {
        AppError::InvalidInput(format!("Invalid multipart request: {}", e.body_text()))
    })?;

    let upload = state.uploads.receive(multipart).await?;
    let key = upload.stored.key.clone();

    match state
        .posts
        .create_record(
            upload.name,
            upload.stored.size,
            upload.stored.key,
            upload.stored.url,
            state.storage.backend_type(),
        )
        .await
    {
        Ok(post) => Ok(Json(post)),
        Err(e) => {
            state.posts.spawn_orphan_cleanup(key);
            Err(e.into())
        }
    }
}
