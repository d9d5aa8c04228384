use crate::{app::AppState, identity, models::Identity};
use axum::{Json, extract::State, http::HeaderMap};

/// `GET /api/viewer` — the caller's identity, or the anonymous one.
pub async fn get_viewer(State(state): State<AppState>, headers: HeaderMap) -> Json<Identity> {
    Json(identity::viewer(state.identity.as_ref(), &headers))
}
