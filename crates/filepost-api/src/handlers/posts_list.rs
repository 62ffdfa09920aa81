use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{extract::State, Json};
use filepost_core::models::Post;
use std::sync::Arc;

#[tracing::instrument(skip(state), fields(operation = "list_posts"))]
pub async fn list_posts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Post>>, HttpAppError> {
    let posts = state.posts.list_records().await?;
    Ok(Json(posts))
}
