//! `GalleryApi` over HTTP with `reqwest`.

use super::{ClientError, ClientResult, GalleryApi, PhotoFile};
use crate::{
    identity::{USER_ID_HEADER, USER_NAME_HEADER},
    models::{
        Comment, CommentId, Created, Event, EventId, Identity, NewComment, NewEvent, NewPhoto,
        PhotoId, PhotoWithUrl, ResolvedUrl, UploadUrl, Uploaded,
    },
};
use reqwest::{RequestBuilder, Response, header::CONTENT_TYPE};
use serde::{Deserialize, de::DeserializeOwned};

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Clone, Debug)]
pub struct HttpGalleryClient {
    http: reqwest::Client,
    base_url: String,
    user: Option<Identity>,
}

impl HttpGalleryClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user: None,
        }
    }

    /// Send identity headers with every request, for servers that trust them.
    pub fn with_user(mut self, user: Identity) -> Self {
        self.user = Some(user);
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.user {
            Some(user) => {
                let request = request.header(USER_ID_HEADER, &user.subject);
                match &user.name {
                    Some(name) => request.header(USER_NAME_HEADER, name),
                    None => request,
                }
            }
            None => request,
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let response = self.authed(self.http.get(self.url(path))).send().await?;
        decode(response).await
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        B: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .authed(self.http.post(self.url(path)).json(body))
            .send()
            .await?;
        decode(response).await
    }
}

/// Decode a success body, or turn the server's JSON error into `ClientError::Api`.
async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }
    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
    };
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

impl GalleryApi for HttpGalleryClient {
    async fn list_events(&self) -> ClientResult<Vec<Event>> {
        self.get("/api/events").await
    }

    async fn create_event(&self, new: NewEvent) -> ClientResult<EventId> {
        let created: Created = self.post("/api/events", &new).await?;
        Ok(created.id)
    }

    async fn list_event_photos(&self, event_id: EventId) -> ClientResult<Vec<PhotoWithUrl>> {
        self.get(&format!("/api/events/{}/photos", event_id)).await
    }

    async fn add_photo(&self, new: NewPhoto) -> ClientResult<PhotoId> {
        let created: Created = self.post("/api/photos", &new).await?;
        Ok(created.id)
    }

    async fn list_comments_for_photo(&self, photo_id: PhotoId) -> ClientResult<Vec<Comment>> {
        self.get(&format!("/api/photos/{}/comments", photo_id))
            .await
    }

    async fn add_comment(&self, new: NewComment) -> ClientResult<CommentId> {
        let created: Created = self.post("/api/comments", &new).await?;
        Ok(created.id)
    }

    async fn generate_upload_url(&self) -> ClientResult<String> {
        let issued: UploadUrl = self
            .post("/api/storage/upload-url", &serde_json::json!({}))
            .await?;
        Ok(issued.upload_url)
    }

    async fn upload_file(&self, upload_url: &str, file: &PhotoFile) -> ClientResult<String> {
        let response = self
            .http
            .post(upload_url)
            .header(CONTENT_TYPE, file.content_type.as_str())
            .body(file.bytes.clone())
            .send()
            .await?;
        let uploaded: Uploaded = decode(response).await?;
        Ok(uploaded.storage_id)
    }

    async fn resolve_storage_url(&self, storage_id: &str) -> ClientResult<Option<String>> {
        let resolved: ResolvedUrl = self
            .get(&format!("/api/storage/{}/url", storage_id))
            .await?;
        Ok(resolved.url)
    }

    async fn get_viewer(&self) -> ClientResult<Identity> {
        self.get("/api/viewer").await
    }
}
