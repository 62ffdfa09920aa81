//! HTTP error response conversion
//!
//! Handlers return `Result<_, HttpAppError>`. Anything convertible into
//! `AppError` becomes an `HttpAppError` through `?` and renders with the same
//! status, body shape and log level.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use filepost_core::{AppError, ErrorMetadata, LogLevel};
use filepost_storage::StorageError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether this error is recoverable (can be retried)
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

/// Wrapper type for AppError to implement IntoResponse
///
/// Needed because of the orphan rule: `IntoResponse` and `AppError` both live
/// in other crates.
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::from(err))
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        HttpAppError(storage_error_to_app(err))
    }
}

/// Map a storage failure onto the request-level error it represents.
///
/// Stream failures are the client's doing (a truncated or oversized upload), so
/// they map to 4xx. Everything else is a storage-side fault.
pub fn storage_error_to_app(err: StorageError) -> AppError {
    match err {
        StorageError::SizeLimitExceeded { limit } => {
            AppError::FileTooLarge(format!("upload exceeds max {} bytes", limit))
        }
        StorageError::Source(msg) => {
            AppError::InvalidInput(format!("Failed to read file data: {}", msg))
        }
        StorageError::NotFound(msg) => AppError::NotFound(msg),
        StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
        StorageError::DeleteFailed(msg) => AppError::StorageDelete(msg),
        StorageError::WriteFailed(msg) | StorageError::BackendError(msg) => {
            AppError::StorageWrite(msg)
        }
        StorageError::Io(err) => AppError::StorageWrite(format!("IO error: {}", err)),
        StorageError::ConfigError(msg) => AppError::Internal(msg),
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Error occurred");
        }
    }
}

/// Detailed body of a non-sensitive error, kept in the response extensions
/// until [`error_details_middleware`] decides whether the client may see it.
#[derive(Debug, Clone)]
pub struct DetailedErrorBody(pub ErrorResponse);

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        let body = ErrorResponse {
            error: app_error.client_message(),
            details: None,
            error_type: None,
            code: app_error.error_code().to_string(),
            recoverable: app_error.is_recoverable(),
            suggested_action: app_error.suggested_action().map(String::from),
        };

        let detailed = (!app_error.is_sensitive()).then(|| ErrorResponse {
            details: Some(app_error.detailed_message()),
            error_type: Some(app_error.error_type().to_string()),
            ..body.clone()
        });

        let mut response = (status, Json(body)).into_response();
        if let Some(detailed) = detailed {
            response
                .extensions_mut()
                .insert(DetailedErrorBody(detailed));
        }
        response
    }
}

/// Swap in the detailed error body outside production.
///
/// The state is `Config::is_production()`. Without this layer error bodies
/// never carry details.
pub async fn error_details_middleware(
    State(is_production): State<bool>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;

    let Some(DetailedErrorBody(detailed)) = response.extensions_mut().remove::<DetailedErrorBody>()
    else {
        return response;
    };
    if is_production {
        return response;
    }

    let (parts, _) = response.into_parts();
    Response::from_parts(parts, Json(detailed).into_response().into_body())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_storage_error_size_limit() {
        let HttpAppError(app_err) = StorageError::SizeLimitExceeded { limit: 3_145_728 }.into();
        match app_err {
            AppError::FileTooLarge(msg) => assert!(msg.contains("3145728")),
            other => panic!("Expected FileTooLarge variant, got {:?}", other),
        }
    }

    #[test]
    fn test_from_storage_error_source() {
        let HttpAppError(app_err) = StorageError::Source("stream ended early".to_string()).into();
        assert!(matches!(app_err, AppError::InvalidInput(_)));
        assert_eq!(app_err.http_status_code(), 400);
    }

    #[test]
    fn test_from_storage_error_write_failed() {
        let HttpAppError(app_err) = StorageError::WriteFailed("disk full".to_string()).into();
        match app_err {
            AppError::StorageWrite(msg) => assert_eq!(msg, "disk full"),
            other => panic!("Expected StorageWrite variant, got {:?}", other),
        }
    }

    #[test]
    fn test_from_storage_error_delete_failed() {
        let HttpAppError(app_err) = StorageError::DeleteFailed("access denied".to_string()).into();
        assert!(matches!(app_err, AppError::StorageDelete(_)));
    }

    #[test]
    fn test_from_storage_error_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::Other, "IO error");
        let HttpAppError(app_err) = StorageError::Io(io_err).into();
        match app_err {
            AppError::StorageWrite(msg) => assert!(msg.contains("IO error")),
            other => panic!("Expected StorageWrite variant, got {:?}", other),
        }
    }

    #[test]
    fn test_sensitive_error_response_hides_details() {
        let response =
            HttpAppError(AppError::StorageWrite("bucket policy denied".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.extensions().get::<DetailedErrorBody>().is_none());
    }

    #[test]
    fn test_client_error_carries_details_for_middleware() {
        let response = HttpAppError(AppError::InvalidInput("No file provided".to_string()))
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let DetailedErrorBody(detailed) = response
            .extensions()
            .get::<DetailedErrorBody>()
            .cloned()
            .expect("detailed body");
        assert_eq!(detailed.error_type.as_deref(), Some("InvalidInput"));
        assert!(detailed
            .details
            .as_deref()
            .is_some_and(|d| d.contains("No file provided")));
    }

    /// Serialized ErrorResponse has "error", "code", "recoverable", and
    /// optionally "details" / "error_type" / "suggested_action".
    #[test]
    fn test_error_response_shape() {
        let response = ErrorResponse {
            error: "Post not found".to_string(),
            details: None,
            error_type: None,
            code: "NOT_FOUND".to_string(),
            recoverable: false,
            suggested_action: None,
        };
        let json = serde_json::to_value(&response).expect("serialize");
        assert_eq!(json.get("code").and_then(|v| v.as_str()), Some("NOT_FOUND"));
        assert_eq!(json.get("recoverable").and_then(|v| v.as_bool()), Some(false));
        assert!(json.get("details").is_none());
        assert!(json.get("error_type").is_none());
    }
}
