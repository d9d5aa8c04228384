//! Per-photo comment thread: the comment snapshot plus an append form.

use super::GalleryApi;
use crate::models::{Comment, CommentId, NewComment, PhotoId, timestamp_now};
use tracing::error;

#[derive(Debug)]
pub struct CommentThread {
    photo_id: PhotoId,
    user_id: String,
    comments: Vec<Comment>,
    input: String,
    is_adding: bool,
}

impl CommentThread {
    pub fn new(photo_id: PhotoId, user_id: impl Into<String>) -> Self {
        Self {
            photo_id,
            user_id: user_id.into(),
            comments: Vec::new(),
            input: String::new(),
            is_adding: false,
        }
    }

    pub fn photo_id(&self) -> PhotoId {
        self.photo_id
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn apply_comments(&mut self, comments: Vec<Comment>) {
        self.comments = comments;
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn is_adding(&self) -> bool {
        self.is_adding
    }

    pub fn can_submit(&self) -> bool {
        !self.is_adding && !self.input.trim().is_empty()
    }

    /// Post the current input as a comment.
    ///
    /// Clears the input on success. On failure the error is logged and the
    /// input is left as typed.
    pub async fn submit<A: GalleryApi>(&mut self, api: &A) -> Option<CommentId> {
        if !self.can_submit() {
            return None;
        }

        self.is_adding = true;
        let result = api
            .add_comment(NewComment {
                photo_id: self.photo_id,
                user_id: self.user_id.clone(),
                text: self.input.clone(),
                created_at: timestamp_now(),
            })
            .await;
        self.is_adding = false;

        match result {
            Ok(id) => {
                self.input.clear();
                Some(id)
            }
            Err(err) => {
                error!("Failed to add comment to photo {}: {}", self.photo_id, err);
                None
            }
        }
    }

    /// Re-read the comment list.
    pub async fn refresh<A: GalleryApi>(&mut self, api: &A) -> super::ClientResult<()> {
        self.comments = api.list_comments_for_photo(self.photo_id).await?;
        Ok(())
    }
}
