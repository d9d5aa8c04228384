mod common;

use event_gallery::models::{Comment, Created, Event, Identity, PhotoWithUrl};
use reqwest::{Client, StatusCode, header::CONTENT_TYPE};
use serde_json::{Value, json};
use std::time::Duration;

async fn create_reunion(client: &Client, server: &common::TestServer) -> uuid::Uuid {
    let response = client
        .post(server.url("/api/events"))
        .json(&json!({"name": "Reunion", "date": "2024-06-01", "description": "Family"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    response.json::<Created>().await.unwrap().id
}

#[tokio::test]
async fn reunion_photo_scenario() {
    let server = common::spawn().await;
    let client = Client::new();

    let event_id = create_reunion(&client, &server).await;

    let events: Vec<Event> = client
        .get(server.url("/api/events"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].id, event_id);
    assert_eq!(events[0].name, "Reunion");
    assert_eq!(events[0].date, "2024-06-01");
    assert_eq!(events[0].description, "Family");

    let empty: Vec<PhotoWithUrl> = client
        .get(server.url(&format!("/api/events/{}/photos", event_id)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(empty.is_empty());

    let response = client
        .post(server.url("/api/photos"))
        .json(&json!({
            "eventId": event_id,
            "storageId": "abc",
            "uploader": "alice",
            "createdAt": "2024-06-01T10:00:00.000Z"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let photos: Vec<Value> = client
        .get(server.url(&format!("/api/events/{}/photos", event_id)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(photos.len(), 1);
    assert_eq!(photos[0]["uploader"], "alice");
    assert_eq!(photos[0]["storageId"], "abc");
    assert_eq!(photos[0]["createdAt"], "2024-06-01T10:00:00.000Z");
    assert_eq!(photos[0]["url"], Value::Null);
}

#[tokio::test]
async fn free_form_event_dates_are_stored_as_sent() {
    let server = common::spawn().await;
    let client = Client::new();

    let response = client
        .post(server.url("/api/events"))
        .json(&json!({"name": "Reunion", "date": "June 1st, 2024", "description": "Family"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let id = response.json::<Created>().await.unwrap().id;

    let event: Event = client
        .get(server.url(&format!("/api/events/{}", id)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(event.date, "June 1st, 2024");
}

#[tokio::test]
async fn first_comment_scenario() {
    let server = common::spawn().await;
    let client = Client::new();
    let event_id = create_reunion(&client, &server).await;

    let photo_id = client
        .post(server.url("/api/photos"))
        .json(&json!({
            "eventId": event_id,
            "storageId": "abc",
            "uploader": "alice",
            "createdAt": "2024-06-01T10:00:00Z"
        }))
        .send()
        .await
        .unwrap()
        .json::<Created>()
        .await
        .unwrap()
        .id;

    let response = client
        .post(server.url("/api/comments"))
        .json(&json!({
            "photoId": photo_id,
            "userId": "bob",
            "text": "Nice!",
            "createdAt": "2024-06-01T10:05:00Z"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let comments: Vec<Comment> = client
        .get(server.url(&format!("/api/photos/{}/comments", photo_id)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].text, "Nice!");
    assert_eq!(comments[0].user_id, "bob");
}

#[tokio::test]
async fn invalid_mutations_are_rejected_with_json_errors() {
    let server = common::spawn().await;
    let client = Client::new();

    let blank = client
        .post(server.url("/api/events"))
        .json(&json!({"name": "  ", "date": "2024-06-01", "description": ""}))
        .send()
        .await
        .unwrap();
    assert_eq!(blank.status(), StatusCode::BAD_REQUEST);
    let body: Value = blank.json().await.unwrap();
    assert_eq!(body["status"], 400);
    assert_eq!(body["error"], "event name must not be empty");

    let orphan_photo = client
        .post(server.url("/api/photos"))
        .json(&json!({
            "eventId": uuid::Uuid::new_v4(),
            "storageId": "abc",
            "uploader": "alice",
            "createdAt": "2024-06-01T10:00:00Z"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(orphan_photo.status(), StatusCode::NOT_FOUND);

    let orphan_comment = client
        .post(server.url("/api/comments"))
        .json(&json!({
            "photoId": uuid::Uuid::new_v4(),
            "userId": "bob",
            "text": "hello?",
            "createdAt": "2024-06-01T10:00:00Z"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(orphan_comment.status(), StatusCode::NOT_FOUND);

    let missing_event = client
        .get(server.url(&format!("/api/events/{}", uuid::Uuid::new_v4())))
        .send()
        .await
        .unwrap();
    assert_eq!(missing_event.status(), StatusCode::NOT_FOUND);
}

async fn assert_json_error(response: reqwest::Response, status: StatusCode) {
    assert_eq!(response.status(), status);
    assert!(
        response.headers()[CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("application/json")
    );
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], status.as_u16());
    assert!(!body["error"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn malformed_requests_get_json_errors() {
    let server = common::spawn().await;
    let client = Client::new();

    let bad_id = client
        .get(server.url("/api/events/not-a-uuid/photos"))
        .send()
        .await
        .unwrap();
    assert_json_error(bad_id, StatusCode::BAD_REQUEST).await;

    let bad_subscription = client
        .get(server.url("/api/subscribe/photos/not-a-uuid/comments"))
        .send()
        .await
        .unwrap();
    assert_json_error(bad_subscription, StatusCode::BAD_REQUEST).await;

    let missing_name = client
        .post(server.url("/api/events"))
        .json(&json!({"date": "2024-06-01"}))
        .send()
        .await
        .unwrap();
    assert_json_error(missing_name, StatusCode::UNPROCESSABLE_ENTITY).await;

    let not_json = client
        .post(server.url("/api/comments"))
        .header(CONTENT_TYPE, "application/json")
        .body("{")
        .send()
        .await
        .unwrap();
    assert_json_error(not_json, StatusCode::BAD_REQUEST).await;
}

#[tokio::test]
async fn upload_url_round_trip() {
    let server = common::spawn().await;
    let client = Client::new();

    let issued: Value = client
        .post(server.url("/api/storage/upload-url"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let upload_url = issued["uploadUrl"].as_str().unwrap().to_string();
    assert!(upload_url.starts_with(&server.url("/api/storage/upload/")));

    let uploaded: Value = client
        .post(&upload_url)
        .header(CONTENT_TYPE, "image/png")
        .body(&b"\x89PNG fake"[..])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let storage_id = uploaded["storageId"].as_str().unwrap().to_string();

    let resolve = || async {
        client
            .get(server.url(&format!("/api/storage/{}/url", storage_id)))
            .send()
            .await
            .unwrap()
            .json::<Value>()
            .await
            .unwrap()
    };
    let first = resolve().await;
    let second = resolve().await;
    assert_eq!(first, second);
    let url = first["url"].as_str().unwrap().to_string();
    assert_eq!(url, server.url(&format!("/api/storage/{}", storage_id)));

    let blob = client.get(&url).send().await.unwrap();
    assert_eq!(blob.status(), StatusCode::OK);
    assert_eq!(blob.headers()[CONTENT_TYPE], "image/png");
    assert_eq!(&blob.bytes().await.unwrap()[..], b"\x89PNG fake");

    let reused = client
        .post(&upload_url)
        .header(CONTENT_TYPE, "image/png")
        .body("again")
        .send()
        .await
        .unwrap();
    assert_eq!(reused.status(), StatusCode::NOT_FOUND);

    let unknown: Value = client
        .get(server.url("/api/storage/abc/url"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(unknown["url"], Value::Null);
}

#[tokio::test]
async fn oversized_and_expired_uploads_are_refused() {
    let server = common::spawn_with(|cfg| cfg.max_upload_bytes = 8).await;
    let client = Client::new();

    let upload_url = server.state.storage.generate_upload_url().await.unwrap();
    let response = client
        .post(&upload_url)
        .body(vec![0u8; 64])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let expired = common::spawn_with(|cfg| cfg.upload_url_ttl_secs = -1).await;
    let upload_url = expired.state.storage.generate_upload_url().await.unwrap();
    let response = client.post(&upload_url).body("late").send().await.unwrap();
    assert_eq!(response.status(), StatusCode::GONE);
}

#[tokio::test]
async fn viewer_defaults_to_anonymous() {
    let server = common::spawn().await;
    let viewer: Identity = reqwest::get(server.url("/api/viewer"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(viewer, Identity::anonymous());
}

#[tokio::test]
async fn header_identity_mode_trusts_proxy_headers() {
    let server = common::spawn_with(|cfg| {
        cfg.identity = event_gallery::identity::IdentityMode::Header;
    })
    .await;
    let viewer: Identity = Client::new()
        .get(server.url("/api/viewer"))
        .header("x-user-id", "alice")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(viewer, Identity::new("alice", None));
}

#[tokio::test]
async fn health_and_readiness() {
    let server = common::spawn().await;
    let health = reqwest::get(server.url("/healthz")).await.unwrap();
    assert_eq!(health.status(), StatusCode::OK);

    let ready = reqwest::get(server.url("/readyz")).await.unwrap();
    assert_eq!(ready.status(), StatusCode::OK);
    let body: Value = ready.json().await.unwrap();
    assert_eq!(body["checks"]["sqlite"]["ok"], true);
    assert_eq!(body["checks"]["blobs"]["ok"], true);
}

/// Read SSE chunks until the accumulated text contains `needle`.
async fn read_until(response: &mut reqwest::Response, seen: &mut String, needle: &str) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !seen.contains(needle) {
            let chunk = response.chunk().await.unwrap().expect("stream ended");
            seen.push_str(&String::from_utf8_lossy(&chunk));
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for {needle:?}; got {seen:?}"));
}

#[tokio::test]
async fn event_subscription_pushes_new_snapshots() {
    let server = common::spawn().await;
    let client = Client::new();

    let mut stream = client
        .get(server.url("/api/subscribe/events"))
        .send()
        .await
        .unwrap();
    assert_eq!(stream.status(), StatusCode::OK);
    assert!(
        stream.headers()[CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/event-stream")
    );

    let mut seen = String::new();
    read_until(&mut stream, &mut seen, "[]").await;
    assert!(seen.contains("snapshot"));

    create_reunion(&client, &server).await;
    read_until(&mut stream, &mut seen, "\"name\":\"Reunion\"").await;
}

#[tokio::test]
async fn photo_subscription_pushes_added_photos() {
    let server = common::spawn().await;
    let client = Client::new();
    let event_id = create_reunion(&client, &server).await;

    let mut stream = client
        .get(server.url(&format!("/api/subscribe/events/{}/photos", event_id)))
        .send()
        .await
        .unwrap();
    let mut seen = String::new();
    read_until(&mut stream, &mut seen, "[]").await;

    client
        .post(server.url("/api/photos"))
        .json(&json!({
            "eventId": event_id,
            "storageId": "abc",
            "uploader": "alice",
            "createdAt": "2024-06-01T10:00:00Z"
        }))
        .send()
        .await
        .unwrap();
    read_until(&mut stream, &mut seen, "\"uploader\":\"alice\"").await;
}

async fn add_photo(
    client: &Client,
    server: &common::TestServer,
    event_id: uuid::Uuid,
    storage_id: &str,
) -> uuid::Uuid {
    client
        .post(server.url("/api/photos"))
        .json(&json!({
            "eventId": event_id,
            "storageId": storage_id,
            "uploader": "alice",
            "createdAt": "2024-06-01T10:00:00.000Z"
        }))
        .send()
        .await
        .unwrap()
        .json::<Created>()
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn comment_subscription_pushes_added_comments() {
    let server = common::spawn().await;
    let client = Client::new();
    let event_id = create_reunion(&client, &server).await;
    let photo_id = add_photo(&client, &server, event_id, "abc").await;

    let mut stream = client
        .get(server.url(&format!("/api/subscribe/photos/{}/comments", photo_id)))
        .send()
        .await
        .unwrap();
    let mut seen = String::new();
    read_until(&mut stream, &mut seen, "[]").await;

    let response = client
        .post(server.url("/api/comments"))
        .json(&json!({
            "photoId": photo_id,
            "userId": "bob",
            "text": "Nice!",
            "createdAt": "2024-06-01T10:05:00.000Z"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    read_until(&mut stream, &mut seen, "\"text\":\"Nice!\"").await;
}

#[tokio::test]
async fn failed_subscription_query_is_sent_as_an_error_event() {
    let server = common::spawn().await;
    sqlx::query("DROP TABLE comments")
        .execute(&*server.state.storage.db)
        .await
        .unwrap();

    let mut stream = Client::new()
        .get(server.url(&format!(
            "/api/subscribe/photos/{}/comments",
            uuid::Uuid::new_v4()
        )))
        .send()
        .await
        .unwrap();
    assert_eq!(stream.status(), StatusCode::OK);

    let mut seen = String::new();
    read_until(&mut stream, &mut seen, "no such table").await;
    assert!(
        seen.contains("event: error") || seen.contains("event:error"),
        "{seen:?}"
    );
    assert!(!seen.contains("snapshot"), "{seen:?}");
}

#[tokio::test]
async fn new_blob_fills_in_a_pending_photo_url() {
    let server = common::spawn().await;
    let client = Client::new();
    let event_id = create_reunion(&client, &server).await;

    let pending = uuid::Uuid::new_v4();
    add_photo(&client, &server, event_id, &pending.to_string()).await;

    let mut stream = client
        .get(server.url(&format!("/api/subscribe/events/{}/photos", event_id)))
        .send()
        .await
        .unwrap();
    let mut seen = String::new();
    read_until(&mut stream, &mut seen, "\"url\":null").await;

    // Metadata for the pending id appears without a change notification.
    sqlx::query(
        "INSERT INTO blobs (id, content_type, size_bytes, etag, created_at)
         VALUES (?, 'image/png', 3, 'etag', ?)",
    )
    .bind(pending)
    .bind(chrono::Utc::now())
    .execute(&*server.state.storage.db)
    .await
    .unwrap();

    let issued: Value = client
        .post(server.url("/api/storage/upload-url"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let uploaded = client
        .post(issued["uploadUrl"].as_str().unwrap())
        .header(CONTENT_TYPE, "image/png")
        .body("png")
        .send()
        .await
        .unwrap();
    assert_eq!(uploaded.status(), StatusCode::OK);

    let expected = format!(
        "\"url\":\"{}\"",
        server.url(&format!("/api/storage/{}", pending))
    );
    read_until(&mut stream, &mut seen, &expected).await;
}
