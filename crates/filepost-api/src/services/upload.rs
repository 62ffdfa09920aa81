//! Upload intake: pulls the file out of a multipart request, gates it and
//! streams it into storage.

use crate::error::storage_error_to_app;
use axum::extract::multipart::{Field, MultipartError};
use axum::extract::Multipart;
use axum::http::{header::CONTENT_LENGTH, StatusCode};
use filepost_core::constants::UPLOAD_FIELD_NAME;
use filepost_core::{AppError, UploadValidator};
use filepost_storage::{
    enforce_size_limit, ByteStream, IncomingFile, Storage, StorageError, StoredObject,
};
use futures::TryStreamExt;
use std::sync::Arc;

/// Name recorded when the client sends a file part without a filename.
const UNNAMED_FILE: &str = "upload";

/// A file that passed the gatekeeper and is durably stored.
#[derive(Debug, Clone)]
pub struct ReceivedUpload {
    /// Original client filename, kept for display
    pub name: String,
    pub stored: StoredObject,
}

#[derive(Clone)]
pub struct UploadService {
    storage: Arc<dyn Storage>,
    validator: UploadValidator,
}

impl UploadService {
    pub fn new(storage: Arc<dyn Storage>, validator: UploadValidator) -> Self {
        Self { storage, validator }
    }

    /// Accept exactly one `file` part and persist it.
    ///
    /// Other parts are skipped. A second `file` part fails the request and the
    /// first one is removed again.
    pub async fn receive(&self, mut multipart: Multipart) -> Result<ReceivedUpload, AppError> {
        let max = self.validator.max_file_size();
        let mut received: Option<ReceivedUpload> = None;

        loop {
            let field = match multipart.next_field().await {
                Ok(Some(field)) => field,
                Ok(None) => break,
                Err(e) => {
                    self.discard(received.as_ref()).await;
                    return Err(multipart_error(e, max));
                }
            };

            if field.name() != Some(UPLOAD_FIELD_NAME) {
                continue;
            }

            if received.is_some() {
                self.discard(received.as_ref()).await;
                return Err(AppError::InvalidInput(
                    "Multiple file fields are not allowed; send exactly one field named 'file'"
                        .to_string(),
                ));
            }

            received = Some(self.persist_field(field).await?);
        }

        received.ok_or_else(|| AppError::InvalidInput("No file provided".to_string()))
    }

    async fn persist_field(&self, field: Field<'_>) -> Result<ReceivedUpload, AppError> {
        let name = field.file_name().unwrap_or(UNNAMED_FILE).to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let declared_size = field
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());

        self.validator.validate(&content_type, declared_size)?;

        let max = self.validator.max_file_size();
        let body: ByteStream<'_> = Box::pin(field.map_err(move |e| multipart_stream_error(e, max)));

        let stored = self
            .storage
            .persist(IncomingFile {
                original_filename: name.clone(),
                content_type: content_type.clone(),
                body: enforce_size_limit(body, max),
            })
            .await
            .map_err(storage_error_to_app)?;

        tracing::info!(
            key = %stored.key,
            content_type = %content_type,
            size_bytes = stored.size,
            "Upload stored"
        );

        Ok(ReceivedUpload { name, stored })
    }

    async fn discard(&self, upload: Option<&ReceivedUpload>) {
        if let Some(upload) = upload {
            if let Err(e) = self.storage.delete(&upload.stored.key).await {
                tracing::warn!(
                    error = %e,
                    key = %upload.stored.key,
                    "Failed to remove stored file of rejected request"
                );
            }
        }
    }
}

/// The request body limit surfaces as a multipart error with status 413.
fn multipart_stream_error(err: MultipartError, max: u64) -> StorageError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        StorageError::SizeLimitExceeded { limit: max }
    } else {
        StorageError::Source(err.body_text())
    }
}

fn multipart_error(err: MultipartError, max: u64) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::FileTooLarge(format!("upload exceeds max {} bytes", max))
    } else {
        AppError::InvalidInput(format!("Failed to read multipart: {}", err.body_text()))
    }
}
