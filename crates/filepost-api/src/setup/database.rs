//! Metadata store setup and initialization

use anyhow::{Context, Result};
use filepost_core::Config;
use filepost_db::{MemoryPostRepository, PgPostRepository, PostRepository};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Build the post repository named by `DATABASE_URL`
pub async fn setup_repository(config: &Config) -> Result<Arc<dyn PostRepository>> {
    if config.uses_memory_store() {
        tracing::warn!("Using in-memory metadata store - records are lost on restart");
        return Ok(Arc::new(MemoryPostRepository::new()));
    }

    let pool = setup_database(config).await?;
    Ok(Arc::new(PgPostRepository::new(pool)))
}

/// Setup database connection pool and run migrations
pub async fn setup_database(config: &Config) -> Result<PgPool> {
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.base.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.base.db_timeout_seconds))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!(
        max_connections = config.base.db_max_connections,
        "Database connected successfully"
    );

    // Run pending migrations on startup (path: workspace migrations/ from crate root)
    let migrations_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../migrations");
    let migrator = sqlx::migrate::Migrator::new(migrations_dir)
        .await
        .context("Failed to load migrations")?;
    migrator
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    Ok(pool)
}
