//! Server-Sent Event subscriptions.
//!
//! Each endpoint sends the current rows immediately as a `snapshot` event
//! and sends them again after every change that affects them. A failed query
//! is reported as an `error` event and the stream keeps going.

use crate::{
    app::AppState,
    extract::Path,
    models::{EventId, PhotoId},
    services::{change_feed::Topic, gallery_service::GalleryResult},
};
use axum::{
    extract::State,
    response::sse::{Event as SseEvent, KeepAlive, Sse},
};
use futures::{Stream, StreamExt};
use serde::Serialize;

fn to_sse<T: Serialize>(snapshot: GalleryResult<T>) -> Result<SseEvent, axum::Error> {
    match snapshot {
        Ok(rows) => SseEvent::default().event("snapshot").json_data(rows),
        Err(err) => {
            tracing::warn!("subscription query failed: {}", err);
            Ok(SseEvent::default().event("error").data(err.to_string()))
        }
    }
}

/// `GET /api/subscribe/events`
pub async fn events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<SseEvent, axum::Error>>> {
    let gallery = state.gallery.clone();
    let stream = state.feed.watch(Topic::Events, move || {
        let gallery = gallery.clone();
        async move { gallery.list_events().await }
    });
    Sse::new(stream.map(to_sse)).keep_alive(KeepAlive::default())
}

/// `GET /api/subscribe/events/{event_id}/photos`
pub async fn event_photos(
    State(state): State<AppState>,
    Path(event_id): Path<EventId>,
) -> Sse<impl Stream<Item = Result<SseEvent, axum::Error>>> {
    let gallery = state.gallery.clone();
    let stream = state.feed.watch(Topic::EventPhotos(event_id), move || {
        let gallery = gallery.clone();
        async move { gallery.list_event_photos(event_id).await }
    });
    Sse::new(stream.map(to_sse)).keep_alive(KeepAlive::default())
}

/// `GET /api/subscribe/photos/{photo_id}/comments`
pub async fn photo_comments(
    State(state): State<AppState>,
    Path(photo_id): Path<PhotoId>,
) -> Sse<impl Stream<Item = Result<SseEvent, axum::Error>>> {
    let gallery = state.gallery.clone();
    let stream = state.feed.watch(Topic::PhotoComments(photo_id), move || {
        let gallery = gallery.clone();
        async move { gallery.list_comments_for_photo(photo_id).await }
    });
    Sse::new(stream.map(to_sse)).keep_alive(KeepAlive::default())
}
