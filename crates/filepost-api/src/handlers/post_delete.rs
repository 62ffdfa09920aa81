use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use filepost_core::AppError;
use std::sync::Arc;
use uuid::Uuid;

/// Delete a post and its stored file
///
/// Ids that do not parse as a UUID cannot name a record, so they get the same
/// 404 as unknown ids.
#[tracing::instrument(skip(state), fields(operation = "delete_post"))]
pub async fn delete_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, HttpAppError> {
    let id = Uuid::parse_str(&id).map_err(|_| AppError::NotFound("Post not found".to_string()))?;

    state.posts.delete_record(id).await?;

    Ok(StatusCode::OK)
}
