//! Route configuration and setup.
//!
//! Post routes and the local file route live here; health checks in [health](health).

mod health;

use crate::error::error_details_middleware;
use crate::handlers::{post_delete::delete_post, post_upload::upload_post, posts_list::list_posts};
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{delete, get},
    Router,
};
use filepost_core::constants::{FILES_ROUTE_PREFIX, MAX_UPLOAD_SIZE_BYTES};
use filepost_core::{Config, StorageBackend};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Room for multipart boundaries and part headers on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: u64 = 1024 * 1024;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    let mut app = Router::new()
        .route("/posts", get(list_posts).post(upload_post))
        .route("/posts/{id}", delete(delete_post))
        .route("/health", get(health::health_check))
        .with_state(state.clone());

    // Remote objects are fetched from the bucket directly
    if state.storage.backend_type() == StorageBackend::Local {
        app = app.nest_service(FILES_ROUTE_PREFIX, ServeDir::new(&config.uploads_dir));
    }

    // The upload path enforces the exact ceiling on the stream; this only keeps
    // axum's 2 MB default from cutting in first.
    let body_limit = (MAX_UPLOAD_SIZE_BYTES + MULTIPART_OVERHEAD_BYTES) as usize;

    let app = app
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(axum::middleware::from_fn_with_state(
            config.is_production(),
            error_details_middleware,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    Ok(app)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let origins = &config.base.cors_origins;
    let cors = if origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers(Any)
    } else {
        let origins = origins
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .map_err(|e| anyhow::anyhow!("Invalid CORS origin '{}': {}", o, e))
            })
            .collect::<Result<Vec<_>, _>>()?;
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers(Any)
    };
    Ok(cors)
}
