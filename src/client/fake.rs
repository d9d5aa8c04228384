//! In-memory `GalleryApi` for exercising the client state machines.

use super::{ClientError, ClientResult, GalleryApi, PhotoFile};
use crate::models::{
    Comment, CommentId, Event, EventId, Identity, NewComment, NewEvent, NewPhoto, Photo, PhotoId,
    PhotoWithUrl, timestamp_now, today,
};
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    ListEvents,
    CreateEvent,
    ListEventPhotos,
    AddPhoto,
    ListComments,
    AddComment,
    GenerateUploadUrl,
    UploadFile,
    ResolveStorageUrl,
    GetViewer,
}

#[derive(Default)]
struct Tables {
    events: Vec<Event>,
    photos: Vec<Photo>,
    comments: Vec<Comment>,
    blobs: Vec<(String, String)>,
    calls: Vec<Step>,
}

#[derive(Default)]
pub struct FakeApi {
    tables: Mutex<Tables>,
    fail_at: Option<Step>,
}

impl FakeApi {
    pub fn failing_at(step: Step) -> Self {
        Self {
            fail_at: Some(step),
            ..Self::default()
        }
    }

    pub fn seed_event(&self, name: &str) -> EventId {
        let id = Uuid::new_v4();
        self.tables.lock().unwrap().events.push(Event {
            id,
            name: name.into(),
            date: today(),
            description: String::new(),
        });
        id
    }

    pub fn seed_photo(&self) -> PhotoId {
        let event_id = self.seed_event("Seeded");
        let id = Uuid::new_v4();
        self.tables.lock().unwrap().photos.push(Photo {
            id,
            event_id,
            storage_id: "seeded".into(),
            uploader: "seed".into(),
            created_at: timestamp_now(),
        });
        id
    }

    pub fn calls(&self) -> Vec<Step> {
        self.tables.lock().unwrap().calls.clone()
    }

    pub fn photos_of(&self, event_id: EventId) -> Vec<PhotoWithUrl> {
        let tables = self.tables.lock().unwrap();
        photos_with_urls(&tables, event_id)
    }

    pub fn uploaded_content_types(&self) -> Vec<String> {
        let tables = self.tables.lock().unwrap();
        tables.blobs.iter().map(|(_, ct)| ct.clone()).collect()
    }

    fn record(&self, step: Step) -> ClientResult<std::sync::MutexGuard<'_, Tables>> {
        let mut tables = self.tables.lock().unwrap();
        tables.calls.push(step);
        if self.fail_at == Some(step) {
            return Err(ClientError::Api {
                status: 503,
                message: "storage unavailable".into(),
            });
        }
        Ok(tables)
    }
}

fn photos_with_urls(tables: &Tables, event_id: EventId) -> Vec<PhotoWithUrl> {
    tables
        .photos
        .iter()
        .filter(|photo| photo.event_id == event_id)
        .map(|photo| PhotoWithUrl {
            photo: photo.clone(),
            url: blob_url(tables, &photo.storage_id),
        })
        .collect()
}

fn blob_url(tables: &Tables, storage_id: &str) -> Option<String> {
    tables
        .blobs
        .iter()
        .any(|(id, _)| id == storage_id)
        .then(|| format!("memory://{}", storage_id))
}

impl GalleryApi for FakeApi {
    async fn list_events(&self) -> ClientResult<Vec<Event>> {
        Ok(self.record(Step::ListEvents)?.events.clone())
    }

    async fn create_event(&self, new: NewEvent) -> ClientResult<EventId> {
        let mut tables = self.record(Step::CreateEvent)?;
        let id = Uuid::new_v4();
        let date = new.date_or_today();
        tables.events.push(Event {
            id,
            name: new.name,
            date,
            description: new.description,
        });
        Ok(id)
    }

    async fn list_event_photos(&self, event_id: EventId) -> ClientResult<Vec<PhotoWithUrl>> {
        let tables = self.record(Step::ListEventPhotos)?;
        Ok(photos_with_urls(&tables, event_id))
    }

    async fn add_photo(&self, new: NewPhoto) -> ClientResult<PhotoId> {
        let mut tables = self.record(Step::AddPhoto)?;
        let id = Uuid::new_v4();
        tables.photos.push(Photo {
            id,
            event_id: new.event_id,
            storage_id: new.storage_id,
            uploader: new.uploader,
            created_at: new.created_at,
        });
        Ok(id)
    }

    async fn list_comments_for_photo(&self, photo_id: PhotoId) -> ClientResult<Vec<Comment>> {
        let tables = self.record(Step::ListComments)?;
        Ok(tables
            .comments
            .iter()
            .filter(|comment| comment.photo_id == photo_id)
            .cloned()
            .collect())
    }

    async fn add_comment(&self, new: NewComment) -> ClientResult<CommentId> {
        let mut tables = self.record(Step::AddComment)?;
        let id = Uuid::new_v4();
        tables.comments.push(Comment {
            id,
            photo_id: new.photo_id,
            user_id: new.user_id,
            text: new.text,
            created_at: new.created_at,
        });
        Ok(id)
    }

    async fn generate_upload_url(&self) -> ClientResult<String> {
        drop(self.record(Step::GenerateUploadUrl)?);
        Ok(format!("memory://upload/{}", Uuid::new_v4()))
    }

    async fn upload_file(&self, _upload_url: &str, file: &PhotoFile) -> ClientResult<String> {
        let mut tables = self.record(Step::UploadFile)?;
        let storage_id = Uuid::new_v4().to_string();
        tables
            .blobs
            .push((storage_id.clone(), file.content_type.clone()));
        Ok(storage_id)
    }

    async fn resolve_storage_url(&self, storage_id: &str) -> ClientResult<Option<String>> {
        let tables = self.record(Step::ResolveStorageUrl)?;
        Ok(blob_url(&tables, storage_id))
    }

    async fn get_viewer(&self) -> ClientResult<Identity> {
        drop(self.record(Step::GetViewer)?);
        Ok(Identity::anonymous())
    }
}
