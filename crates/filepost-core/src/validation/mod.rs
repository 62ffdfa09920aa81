//! Validation modules

pub mod upload;

pub use upload::{normalize_mime_type, UploadValidator, ValidationError};
