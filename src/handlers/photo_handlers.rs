//! HTTP handlers for photo records and comments.

use crate::{
    app::AppState,
    errors::AppError,
    extract::{Path, Payload},
    models::{Comment, Created, NewComment, NewPhoto, PhotoId},
};
use axum::{
    Json,
    extract::State,
    http::StatusCode,
};

/// `POST /api/photos` — records a photo once its blob has been uploaded.
pub async fn add_photo(
    State(state): State<AppState>,
    Payload(payload): Payload<NewPhoto>,
) -> Result<(StatusCode, Json<Created>), AppError> {
    let id = state.gallery.add_photo(payload).await?;
    Ok((StatusCode::CREATED, Json(Created { id })))
}

/// `GET /api/photos/{photo_id}/comments`
pub async fn list_comments(
    State(state): State<AppState>,
    Path(photo_id): Path<PhotoId>,
) -> Result<Json<Vec<Comment>>, AppError> {
    Ok(Json(state.gallery.list_comments_for_photo(photo_id).await?))
}

/// `POST /api/comments`
pub async fn add_comment(
    State(state): State<AppState>,
    Payload(payload): Payload<NewComment>,
) -> Result<(StatusCode, Json<Created>), AppError> {
    let id = state.gallery.add_comment(payload).await?;
    Ok((StatusCode::CREATED, Json(Created { id })))
}
