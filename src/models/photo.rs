//! Represents a photo record: a reference to an uploaded blob plus metadata.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::event::EventId;

pub type PhotoId = Uuid;

/// A photo attached to an event.
///
/// The row stores only the opaque `storage_id`; the fetchable URL is resolved
/// at read time (see [`PhotoWithUrl`]).
#[derive(Serialize, Deserialize, Clone, FromRow, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: PhotoId,

    /// Parent event.
    pub event_id: EventId,

    /// Handle returned by the upload endpoint. Not checked against blob storage.
    pub storage_id: String,

    /// Subject of whoever uploaded the photo.
    pub uploader: String,

    /// Client-supplied timestamp text, stored as sent.
    pub created_at: String,
}

/// A photo as returned by `listEventPhotos`, with its display URL.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PhotoWithUrl {
    #[serde(flatten)]
    pub photo: Photo,

    /// `None` when the storage id does not resolve to a stored blob.
    pub url: Option<String>,
}

/// Arguments of `addPhoto`.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct NewPhoto {
    pub event_id: EventId,
    pub storage_id: String,
    pub uploader: String,
    pub created_at: String,
}
