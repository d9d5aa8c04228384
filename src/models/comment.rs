//! Represents a text comment attached to a photo.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::photo::PhotoId;

pub type CommentId = Uuid;

#[derive(Serialize, Deserialize, Clone, FromRow, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub photo_id: PhotoId,
    pub user_id: String,
    /// Stored exactly as submitted.
    pub text: String,
    pub created_at: String,
}

/// Arguments of `addComment`.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub photo_id: PhotoId,
    pub user_id: String,
    pub text: String,
    pub created_at: String,
}
