//! Fixed limits and defaults.

/// Upload ceiling: 3 MiB.
pub const MAX_UPLOAD_SIZE_BYTES: u64 = 3 * 1024 * 1024;

/// Content types accepted by the upload gatekeeper.
pub const ALLOWED_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/pjpeg", "image/png", "image/gif"];

/// Route prefix under which the local backend's files are served.
pub const FILES_ROUTE_PREFIX: &str = "/files";

/// Default directory for the local storage backend.
pub const DEFAULT_UPLOADS_DIR: &str = "tmp/uploads";

/// Multipart field that carries the uploaded file.
pub const UPLOAD_FIELD_NAME: &str = "file";
