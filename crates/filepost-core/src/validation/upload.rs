//! Upload gatekeeper: content-type allow-list and size ceiling.

use crate::constants::{ALLOWED_CONTENT_TYPES, MAX_UPLOAD_SIZE_BYTES};

/// Reasons an upload is rejected before it reaches a storage backend
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid file type: {content_type} (allowed: {allowed:?})")]
    InvalidFileType {
        content_type: String,
        allowed: Vec<String>,
    },

    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: u64, max: u64 },
}

/// Normalize MIME type by stripping parameters (e.g. "image/png; q=1" -> "image/png").
pub fn normalize_mime_type(content_type: &str) -> &str {
    content_type
        .split(';')
        .next()
        .map(|s| s.trim())
        .unwrap_or(content_type)
}

/// Validates incoming uploads against a fixed allow-list and byte ceiling.
#[derive(Debug, Clone)]
pub struct UploadValidator {
    max_file_size: u64,
    allowed_content_types: Vec<String>,
}

impl Default for UploadValidator {
    fn default() -> Self {
        Self::new(
            MAX_UPLOAD_SIZE_BYTES,
            ALLOWED_CONTENT_TYPES.iter().map(|s| s.to_string()).collect(),
        )
    }
}

impl UploadValidator {
    pub fn new(max_file_size: u64, allowed_content_types: Vec<String>) -> Self {
        Self {
            max_file_size,
            allowed_content_types: allowed_content_types
                .into_iter()
                .map(|ct| ct.to_lowercase())
                .collect(),
        }
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    pub fn allowed_content_types(&self) -> &[String] {
        &self.allowed_content_types
    }

    /// Check content type and, when the client declared one, the size.
    ///
    /// The declared size is advisory; the byte stream is still bounded while it
    /// is persisted.
    pub fn validate(
        &self,
        content_type: &str,
        declared_size: Option<u64>,
    ) -> Result<(), ValidationError> {
        self.validate_content_type(content_type)?;
        if let Some(size) = declared_size {
            self.validate_size(size)?;
        }
        Ok(())
    }

    pub fn validate_content_type(&self, content_type: &str) -> Result<(), ValidationError> {
        let normalized = normalize_mime_type(content_type).to_lowercase();

        if !self.allowed_content_types.iter().any(|ct| *ct == normalized) {
            return Err(ValidationError::InvalidFileType {
                content_type: content_type.to_string(),
                allowed: self.allowed_content_types.clone(),
            });
        }

        Ok(())
    }

    pub fn validate_size(&self, size: u64) -> Result<(), ValidationError> {
        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }
        Ok(())
    }
}
