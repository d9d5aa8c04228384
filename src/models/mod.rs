//! Core data models for the event gallery.
//!
//! Rows map to SQLite tables via `sqlx::FromRow` and serialize as camelCase
//! JSON via `serde`, which is the shape clients see on the wire.

pub mod blob;
pub mod comment;
pub mod event;
pub mod photo;
pub mod viewer;

pub use blob::{Blob, ResolvedUrl, UploadUrl, Uploaded};
pub use comment::{Comment, CommentId, NewComment};
pub use event::{Event, EventId, NewEvent, today};
pub use photo::{NewPhoto, Photo, PhotoId, PhotoWithUrl};
pub use viewer::Identity;

/// Body returned by every insert endpoint.
#[derive(serde::Serialize, serde::Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Created {
    pub id: uuid::Uuid,
}

/// Current time as an ISO-8601 UTC string with milliseconds, the form
/// clients stamp `createdAt` with.
pub fn timestamp_now() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
