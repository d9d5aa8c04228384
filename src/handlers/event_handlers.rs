//! HTTP handlers for events and their photo listings.

use crate::{
    app::AppState,
    errors::AppError,
    extract::{Path, Payload},
    models::{Created, Event, EventId, NewEvent, PhotoWithUrl},
};
use axum::{
    Json,
    extract::State,
    http::StatusCode,
};

/// `GET /api/events`
pub async fn list_events(State(state): State<AppState>) -> Result<Json<Vec<Event>>, AppError> {
    Ok(Json(state.gallery.list_events().await?))
}

/// `POST /api/events` — `{name, date?, description?}` → `201 {id}`
pub async fn create_event(
    State(state): State<AppState>,
    Payload(payload): Payload<NewEvent>,
) -> Result<(StatusCode, Json<Created>), AppError> {
    let id = state.gallery.create_event(payload).await?;
    Ok((StatusCode::CREATED, Json(Created { id })))
}

/// `GET /api/events/{event_id}`
pub async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<EventId>,
) -> Result<Json<Event>, AppError> {
    Ok(Json(state.gallery.get_event(event_id).await?))
}

/// `GET /api/events/{event_id}/photos`
pub async fn list_event_photos(
    State(state): State<AppState>,
    Path(event_id): Path<EventId>,
) -> Result<Json<Vec<PhotoWithUrl>>, AppError> {
    Ok(Json(state.gallery.list_event_photos(event_id).await?))
}
