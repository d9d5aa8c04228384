//! Defines routes for the gallery API.
//!
//! ## Structure
//! - **Queries**
//!   - `GET  /api/viewer`
//!   - `GET  /api/events`, `GET /api/events/{event_id}`
//!   - `GET  /api/events/{event_id}/photos`
//!   - `GET  /api/photos/{photo_id}/comments`
//!   - `GET  /api/storage/{storage_id}/url`
//!
//! - **Mutations**
//!   - `POST /api/events`, `POST /api/photos`, `POST /api/comments`
//!   - `POST /api/storage/upload-url`
//!
//! - **Blob transfer**
//!   - `POST /api/storage/upload/{token}` — one-time upload target
//!   - `GET  /api/storage/{storage_id}` — download
//!
//! - **Subscriptions** (Server-Sent Events)
//!   - `GET  /api/subscribe/events`
//!   - `GET  /api/subscribe/events/{event_id}/photos`
//!   - `GET  /api/subscribe/photos/{photo_id}/comments`

use crate::{
    app::AppState,
    handlers::{
        event_handlers::{create_event, get_event, list_event_photos, list_events},
        health_handlers::{healthz, readyz},
        photo_handlers::{add_comment, add_photo, list_comments},
        storage_handlers::{generate_upload_url, get_blob, resolve_url, upload},
        subscription_handlers,
        viewer_handlers::get_viewer,
    },
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

/// Build the router with all gallery routes, carrying `AppState` to handlers.
pub fn routes(state: AppState) -> Router {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/api/viewer", get(get_viewer))
        .route("/api/events", get(list_events).post(create_event))
        .route("/api/events/{event_id}", get(get_event))
        .route("/api/events/{event_id}/photos", get(list_event_photos))
        .route("/api/photos", post(add_photo))
        .route("/api/photos/{photo_id}/comments", get(list_comments))
        .route("/api/comments", post(add_comment))
        .route("/api/storage/upload-url", post(generate_upload_url))
        // The upload handler enforces its own limit while streaming.
        .route(
            "/api/storage/upload/{token}",
            post(upload).layer(DefaultBodyLimit::disable()),
        )
        .route("/api/storage/{storage_id}", get(get_blob))
        .route("/api/storage/{storage_id}/url", get(resolve_url))
        .route("/api/subscribe/events", get(subscription_handlers::events))
        .route(
            "/api/subscribe/events/{event_id}/photos",
            get(subscription_handlers::event_photos),
        )
        .route(
            "/api/subscribe/photos/{photo_id}/comments",
            get(subscription_handlers::photo_comments),
        )
        .with_state(state)
}
