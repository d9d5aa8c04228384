//! Upload flow: request an upload URL, send the bytes straight to storage,
//! then record the photo.
//!
//! ```text
//! Idle -> RequestingUrl -> Transferring -> RecordingMetadata -> Done
//!   \__________\_______________\__________________\__________> Failed
//! ```
//!
//! Failures are reported once and never retried; an attempt that has started
//! runs to `Done` or `Failed`.

use super::{ClientError, GalleryApi, PhotoFile};
use crate::models::{EventId, NewPhoto, PhotoId, timestamp_now};
use tracing::{debug, info};

pub const NO_FILE_SELECTED: &str = "No file selected.";

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum UploadState {
    #[default]
    Idle,
    RequestingUrl,
    Transferring,
    RecordingMetadata,
    Done,
    /// User-visible reason.
    Failed(String),
}

impl UploadState {
    pub fn is_in_progress(&self) -> bool {
        matches!(
            self,
            UploadState::RequestingUrl | UploadState::Transferring | UploadState::RecordingMetadata
        )
    }
}

/// Upload control for one event.
#[derive(Debug)]
pub struct UploadForm {
    event_id: EventId,
    uploader: String,
    file: Option<PhotoFile>,
    state: UploadState,
}

impl UploadForm {
    pub fn new(event_id: EventId, uploader: impl Into<String>) -> Self {
        Self {
            event_id,
            uploader: uploader.into(),
            file: None,
            state: UploadState::Idle,
        }
    }

    pub fn select_file(&mut self, file: PhotoFile) {
        self.file = Some(file);
    }

    pub fn selected_file(&self) -> Option<&PhotoFile> {
        self.file.as_ref()
    }

    pub fn state(&self) -> &UploadState {
        &self.state
    }

    /// The message to show next to the form, if the last attempt failed.
    pub fn error(&self) -> Option<&str> {
        match &self.state {
            UploadState::Failed(message) => Some(message),
            _ => None,
        }
    }

    fn enter(&mut self, next: UploadState) {
        debug!("upload for event {}: {:?} -> {:?}", self.event_id, self.state, next);
        self.state = next;
    }

    /// Run one upload attempt with the selected file.
    ///
    /// Without a file the attempt fails before any request is made. On
    /// success the selection is cleared and the new photo id returned.
    pub async fn submit<A: GalleryApi>(&mut self, api: &A) -> Option<PhotoId> {
        let Some(file) = self.file.clone() else {
            self.enter(UploadState::Failed(NO_FILE_SELECTED.to_string()));
            return None;
        };

        match self.run(api, &file).await {
            Ok(photo_id) => {
                self.file = None;
                self.enter(UploadState::Done);
                info!("uploaded photo {} to event {}", photo_id, self.event_id);
                Some(photo_id)
            }
            Err(err) => {
                self.enter(UploadState::Failed(format!("Upload failed: {}", err)));
                None
            }
        }
    }

    async fn run<A: GalleryApi>(&mut self, api: &A, file: &PhotoFile) -> Result<PhotoId, ClientError> {
        self.enter(UploadState::RequestingUrl);
        let upload_url = api.generate_upload_url().await?;

        self.enter(UploadState::Transferring);
        let storage_id = api.upload_file(&upload_url, file).await?;

        self.enter(UploadState::RecordingMetadata);
        api.add_photo(NewPhoto {
            event_id: self.event_id,
            storage_id,
            uploader: self.uploader.clone(),
            created_at: timestamp_now(),
        })
        .await
    }
}
