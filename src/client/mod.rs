//! Caller-side orchestration of the gallery API.
//!
//! Everything here talks to the backend through [`GalleryApi`];
//! [`http::HttpGalleryClient`] is the networked implementation. The view
//! types hold only ephemeral state and apply whatever snapshots they are
//! given, whether those come from a plain query or a subscription.

pub mod comments;
pub mod gallery;
pub mod http;
pub mod upload;

#[cfg(test)]
pub(crate) mod fake;

use crate::models::{
    Comment, CommentId, Event, EventId, Identity, NewComment, NewEvent, NewPhoto, PhotoId,
    PhotoWithUrl,
};
use bytes::Bytes;
use std::future::Future;
use thiserror::Error;

pub use comments::CommentThread;
pub use gallery::{EventForm, GalleryView};
pub use http::HttpGalleryClient;
pub use upload::{UploadForm, UploadState};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    #[error("{message} (HTTP {status})")]
    Api { status: u16, message: String },
}

pub type ClientResult<T> = Result<T, ClientError>;

/// A file picked for upload.
#[derive(Clone, Debug)]
pub struct PhotoFile {
    pub bytes: Bytes,
    /// MIME type sent as the upload's `Content-Type`.
    pub content_type: String,
}

impl PhotoFile {
    pub fn new(bytes: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: content_type.into(),
        }
    }
}

/// The backend operations as seen by a caller.
pub trait GalleryApi: Send + Sync {
    fn list_events(&self) -> impl Future<Output = ClientResult<Vec<Event>>> + Send;

    fn create_event(&self, new: NewEvent) -> impl Future<Output = ClientResult<EventId>> + Send;

    fn list_event_photos(
        &self,
        event_id: EventId,
    ) -> impl Future<Output = ClientResult<Vec<PhotoWithUrl>>> + Send;

    fn add_photo(&self, new: NewPhoto) -> impl Future<Output = ClientResult<PhotoId>> + Send;

    fn list_comments_for_photo(
        &self,
        photo_id: PhotoId,
    ) -> impl Future<Output = ClientResult<Vec<Comment>>> + Send;

    fn add_comment(&self, new: NewComment)
    -> impl Future<Output = ClientResult<CommentId>> + Send;

    fn generate_upload_url(&self) -> impl Future<Output = ClientResult<String>> + Send;

    /// Send the file straight to an upload URL; returns the storage id.
    fn upload_file(
        &self,
        upload_url: &str,
        file: &PhotoFile,
    ) -> impl Future<Output = ClientResult<String>> + Send;

    fn resolve_storage_url(
        &self,
        storage_id: &str,
    ) -> impl Future<Output = ClientResult<Option<String>>> + Send;

    fn get_viewer(&self) -> impl Future<Output = ClientResult<Identity>> + Send;
}
