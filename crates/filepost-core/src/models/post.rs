//! Upload record: metadata describing one stored file.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::FILES_ROUTE_PREFIX;
use crate::storage_types::StorageBackend;

/// Metadata record for one uploaded file.
///
/// `url` is always populated by the time a record is returned to readers; the
/// backend that holds the bytes is kept for delete-time checks but not exposed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub name: String,
    pub size: i64,
    pub key: String,
    pub url: String,
    #[serde(skip, default)]
    pub backend: StorageBackend,
    pub created_at: DateTime<Utc>,
}

/// Fields needed to insert a record after the backend has persisted the bytes.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub name: String,
    pub size: i64,
    pub key: String,
    pub url: String,
    pub backend: StorageBackend,
}

impl NewPost {
    /// Assign identity and creation time.
    pub fn into_post(self) -> Post {
        Post {
            id: Uuid::new_v4(),
            name: self.name,
            size: self.size,
            key: self.key,
            url: self.url,
            backend: self.backend,
            created_at: Utc::now(),
        }
    }
}

/// Public address of a locally stored file: `<base>/files/<key>`.
pub fn derive_public_url(base_url: &str, key: &str) -> String {
    format!(
        "{}{}/{}",
        base_url.trim_end_matches('/'),
        FILES_ROUTE_PREFIX,
        key
    )
}
