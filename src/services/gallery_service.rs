//! GalleryService — the query and mutation functions behind the API.
//!
//! Every operation is stateless given the database contents. Mutations
//! publish a change topic once their write has committed.

use crate::{
    models::{
        Comment, CommentId, Event, EventId, NewComment, NewEvent, NewPhoto, Photo, PhotoId,
        PhotoWithUrl,
    },
    services::{
        change_feed::{ChangeFeed, Topic},
        storage_service::StorageService,
    },
};
use sqlx::SqlitePool;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum GalleryError {
    #[error("event name must not be empty")]
    EmptyEventName,
    #[error("event `{0}` not found")]
    EventNotFound(EventId),
    #[error("photo `{0}` not found")]
    PhotoNotFound(PhotoId),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type GalleryResult<T> = Result<T, GalleryError>;

#[derive(Clone)]
pub struct GalleryService {
    db: Arc<SqlitePool>,
    storage: StorageService,
    feed: ChangeFeed,
}

impl GalleryService {
    pub fn new(db: Arc<SqlitePool>, storage: StorageService, feed: ChangeFeed) -> Self {
        Self { db, storage, feed }
    }

    pub fn feed(&self) -> &ChangeFeed {
        &self.feed
    }

    /// All events in insertion order.
    pub async fn list_events(&self) -> GalleryResult<Vec<Event>> {
        let events = sqlx::query_as::<_, Event>(
            "SELECT id, name, date, description FROM events ORDER BY rowid",
        )
        .fetch_all(&*self.db)
        .await?;
        Ok(events)
    }

    pub async fn get_event(&self, id: EventId) -> GalleryResult<Event> {
        sqlx::query_as::<_, Event>("SELECT id, name, date, description FROM events WHERE id = ?")
            .bind(id)
            .fetch_optional(&*self.db)
            .await?
            .ok_or(GalleryError::EventNotFound(id))
    }

    /// Insert an event and return its id.
    ///
    /// The name is stored as given but must contain something besides
    /// whitespace. The date is stored exactly as supplied; a blank or missing
    /// one becomes today's UTC date.
    pub async fn create_event(&self, new: NewEvent) -> GalleryResult<EventId> {
        if new.name.trim().is_empty() {
            return Err(GalleryError::EmptyEventName);
        }
        let id = Uuid::new_v4();
        let date = new.date_or_today();

        sqlx::query("INSERT INTO events (id, name, date, description) VALUES (?, ?, ?, ?)")
            .bind(id)
            .bind(&new.name)
            .bind(&date)
            .bind(&new.description)
            .execute(&*self.db)
            .await?;

        info!("created event {} ({:?}) on {}", id, new.name, date);
        self.feed.publish(Topic::Events);
        Ok(id)
    }

    async fn ensure_event_exists(&self, id: EventId) -> GalleryResult<()> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM events WHERE id = ?")
            .bind(id)
            .fetch_optional(&*self.db)
            .await?;
        found.map(|_| ()).ok_or(GalleryError::EventNotFound(id))
    }

    async fn ensure_photo_exists(&self, id: PhotoId) -> GalleryResult<()> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM photos WHERE id = ?")
            .bind(id)
            .fetch_optional(&*self.db)
            .await?;
        found.map(|_| ()).ok_or(GalleryError::PhotoNotFound(id))
    }

    /// Photos of an event with their display URLs.
    ///
    /// An unknown event simply has no photos. A storage id that cannot be
    /// resolved yields `url: None` rather than failing the whole listing.
    pub async fn list_event_photos(&self, event_id: EventId) -> GalleryResult<Vec<PhotoWithUrl>> {
        let photos = sqlx::query_as::<_, Photo>(
            "SELECT id, event_id, storage_id, uploader, created_at
             FROM photos WHERE event_id = ? ORDER BY rowid",
        )
        .bind(event_id)
        .fetch_all(&*self.db)
        .await?;

        let mut resolved = Vec::with_capacity(photos.len());
        for photo in photos {
            let url = match self.storage.resolve_url(&photo.storage_id).await {
                Ok(url) => url,
                Err(err) => {
                    warn!(
                        "could not resolve storage id {} for photo {}: {}",
                        photo.storage_id, photo.id, err
                    );
                    None
                }
            };
            resolved.push(PhotoWithUrl { photo, url });
        }
        Ok(resolved)
    }

    /// Record a photo under an existing event.
    ///
    /// The storage id is not checked against blob storage: the blob upload
    /// and this metadata row are separate steps.
    pub async fn add_photo(&self, new: NewPhoto) -> GalleryResult<PhotoId> {
        self.ensure_event_exists(new.event_id).await?;
        let id = Uuid::new_v4();

        sqlx::query(
            "INSERT INTO photos (id, event_id, storage_id, uploader, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(new.event_id)
        .bind(&new.storage_id)
        .bind(&new.uploader)
        .bind(&new.created_at)
        .execute(&*self.db)
        .await?;

        info!(
            "added photo {} to event {} by {}",
            id, new.event_id, new.uploader
        );
        self.feed.publish(Topic::EventPhotos(new.event_id));
        Ok(id)
    }

    /// Comments on a photo in insertion order.
    pub async fn list_comments_for_photo(&self, photo_id: PhotoId) -> GalleryResult<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(
            "SELECT id, photo_id, user_id, text, created_at
             FROM comments WHERE photo_id = ? ORDER BY rowid",
        )
        .bind(photo_id)
        .fetch_all(&*self.db)
        .await?;
        Ok(comments)
    }

    pub async fn add_comment(&self, new: NewComment) -> GalleryResult<CommentId> {
        self.ensure_photo_exists(new.photo_id).await?;
        let id = Uuid::new_v4();

        sqlx::query(
            "INSERT INTO comments (id, photo_id, user_id, text, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(new.photo_id)
        .bind(&new.user_id)
        .bind(&new.text)
        .bind(&new.created_at)
        .execute(&*self.db)
        .await?;

        info!("added comment {} to photo {}", id, new.photo_id);
        self.feed.publish(Topic::PhotoComments(new.photo_id));
        Ok(id)
    }
}
