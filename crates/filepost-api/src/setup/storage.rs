//! Storage setup and initialization

use anyhow::Result;
use filepost_core::Config;
use filepost_storage::{create_storage, Storage};
use std::sync::Arc;

/// Create the configured backend once; it is injected everywhere from here.
pub async fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    tracing::info!("Initializing storage backend...");
    let storage = create_storage(config).await?;
    tracing::info!(
        backend = %storage.backend_type(),
        delete_policy = ?config.delete_policy,
        "Storage backend initialized successfully"
    );
    Ok(storage)
}
