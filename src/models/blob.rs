//! Metadata for an uploaded blob.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A blob accepted through a one-time upload URL.
///
/// The struct holds metadata only; the payload lives on disk under the
/// storage directory.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Blob {
    /// The storage id handed back to the uploader.
    pub id: Uuid,

    /// MIME type sent with the upload, if any.
    pub content_type: Option<String>,

    pub size_bytes: i64,

    /// Hex MD5 of the payload.
    pub etag: String,

    pub created_at: DateTime<Utc>,
}

/// Body of `POST /api/storage/upload-url`.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrl {
    pub upload_url: String,
}

/// Body returned after a completed upload.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Uploaded {
    pub storage_id: String,
}

/// Body of `GET /api/storage/{storage_id}/url`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ResolvedUrl {
    pub url: Option<String>,
}
