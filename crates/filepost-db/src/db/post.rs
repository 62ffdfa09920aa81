//! Post repository: CRUD for the posts table.

use async_trait::async_trait;
use filepost_core::models::Post;
use filepost_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

/// Metadata store for upload records.
///
/// Implementations only hold records. Stored bytes are the caller's concern.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Insert a fully formed record and return it as stored.
    async fn insert(&self, post: &Post) -> Result<Post, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<Post>, AppError>;

    /// All records, oldest first.
    async fn list(&self) -> Result<Vec<Post>, AppError>;

    /// Remove a record. Returns `false` when no record had this id.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    /// Cheap connectivity check for health endpoints.
    async fn ping(&self) -> Result<(), AppError>;
}

/// Repository for the posts table.
#[derive(Clone)]
pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    #[tracing::instrument(skip(self, post), fields(db.table = "posts", db.record_id = %post.id))]
    async fn insert(&self, post: &Post) -> Result<Post, AppError> {
        let row = sqlx::query_as::<Postgres, Post>(
            r#"
            INSERT INTO posts (id, name, size, key, url, backend, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, name, size, key, url, backend, created_at
            "#,
        )
        .bind(post.id)
        .bind(&post.name)
        .bind(post.size)
        .bind(&post.key)
        .bind(&post.url)
        .bind(post.backend)
        .bind(post.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    #[tracing::instrument(skip(self), fields(db.table = "posts", db.record_id = %id))]
    async fn get(&self, id: Uuid) -> Result<Option<Post>, AppError> {
        let row = sqlx::query_as::<Postgres, Post>(
            "SELECT id, name, size, key, url, backend, created_at FROM posts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    #[tracing::instrument(skip(self), fields(db.table = "posts"))]
    async fn list(&self) -> Result<Vec<Post>, AppError> {
        let rows = sqlx::query_as::<Postgres, Post>(
            "SELECT id, name, size, key, url, backend, created_at FROM posts ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    #[tracing::instrument(skip(self), fields(db.table = "posts", db.record_id = %id))]
    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
