//! Health endpoint integration tests.

mod helpers;

use helpers::{setup_test_app, setup_test_app_with, FailingInsertRepository};
use serde_json::Value;
use std::sync::Arc;

#[tokio::test]
async fn test_health_reports_healthy() {
    let app = setup_test_app().await;

    let response = app.client().get("/health").await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "healthy");
    assert_eq!(body["storage"], "healthy");
}

#[tokio::test]
async fn test_health_unavailable_when_store_is_down() {
    let app = setup_test_app_with(Arc::new(FailingInsertRepository), &[]).await;

    let response = app.client().get("/health").await;
    assert_eq!(response.status_code(), 503);

    let body: Value = response.json();
    assert_eq!(body["status"], "unhealthy");
    assert!(body["database"].as_str().unwrap().starts_with("unhealthy"));
}
