//! HTTP handlers for blob storage: upload URLs, uploads, URL resolution and
//! downloads. Bodies are streamed in both directions.

use crate::{
    app::AppState,
    errors::AppError,
    extract::Path,
    models::{Blob, ResolvedUrl, UploadUrl, Uploaded},
};
use axum::{
    Json,
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::Response,
};
use futures::StreamExt;
use std::io;
use tokio_util::io::ReaderStream;
use uuid::Uuid;

/// `POST /api/storage/upload-url` — issue a one-time upload URL.
pub async fn generate_upload_url(
    State(state): State<AppState>,
) -> Result<Json<UploadUrl>, AppError> {
    let upload_url = state.storage.generate_upload_url().await?;
    Ok(Json(UploadUrl { upload_url }))
}

/// `POST /api/storage/upload/{token}` — raw file body, `Content-Type` is kept.
pub async fn upload(
    State(state): State<AppState>,
    Path(token): Path<Uuid>,
    headers: HeaderMap,
    body: Body,
) -> Result<Json<Uploaded>, AppError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());

    let stream = body
        .into_data_stream()
        .map(|chunk| chunk.map_err(io::Error::other));

    let blob = state
        .storage
        .accept_upload(token, content_type, stream)
        .await?;

    Ok(Json(Uploaded {
        storage_id: blob.id.to_string(),
    }))
}

/// `GET /api/storage/{storage_id}/url`
pub async fn resolve_url(
    State(state): State<AppState>,
    Path(storage_id): Path<String>,
) -> Result<Json<ResolvedUrl>, AppError> {
    let url = state.storage.resolve_url(&storage_id).await?;
    Ok(Json(ResolvedUrl { url }))
}

/// `GET /api/storage/{storage_id}` — stream the stored bytes.
pub async fn get_blob(
    State(state): State<AppState>,
    Path(storage_id): Path<String>,
) -> Result<Response, AppError> {
    let (blob, file) = state.storage.open_blob(&storage_id).await?;
    let mut response = Response::new(Body::from_stream(ReaderStream::new(file)));
    *response.status_mut() = StatusCode::OK;
    set_blob_headers(response.headers_mut(), &blob);
    Ok(response)
}

fn set_blob_headers(headers: &mut HeaderMap, blob: &Blob) {
    let content_type = blob
        .content_type
        .as_deref()
        .and_then(|v| HeaderValue::from_str(v).ok())
        .unwrap_or_else(|| HeaderValue::from_static("application/octet-stream"));
    headers.insert(header::CONTENT_TYPE, content_type);
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(blob.size_bytes.max(0)));

    if let Ok(value) = HeaderValue::from_str(&format!("\"{}\"", blob.etag)) {
        headers.insert(header::ETAG, value);
    }
    // Blobs are immutable once stored.
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("public, max-age=31536000, immutable"),
    );
}
