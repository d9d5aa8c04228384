//! src/services/storage_service.rs
//!
//! StorageService — blob storage for uploaded photos. Metadata lives in
//! SQLite; payloads live on local disk sharded beneath
//! `base_path/{shard}/{shard}/{blob_id}`.
//!
//! Uploads follow a two-phase pattern: a caller first obtains a one-time
//! upload URL (an `upload_tickets` row), then POSTs the raw bytes to it. The
//! blob id returned by the second step is the storage id photos refer to.

use crate::{
    models::Blob,
    services::change_feed::{ChangeFeed, Topic},
};
use bytes::Bytes;
use chrono::{DateTime, Duration, Utc};
use futures::{Stream, StreamExt, pin_mut};
use md5::Context;
use sqlx::SqlitePool;
use std::{
    io::{self, ErrorKind},
    path::{Path, PathBuf},
    sync::Arc,
};
use thiserror::Error;
use tokio::{
    fs::{self, File},
    io::AsyncWriteExt,
};
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("upload url not found or already used")]
    UploadUrlNotFound,
    #[error("upload url has expired")]
    UploadUrlExpired,
    #[error("upload exceeds the {limit} byte limit")]
    PayloadTooLarge { limit: u64 },
    #[error("blob `{0}` not found")]
    BlobNotFound(String),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

pub const DEFAULT_UPLOAD_TTL_SECS: i64 = 3600;
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 20 * 1024 * 1024;

#[derive(Clone)]
pub struct StorageService {
    /// Shared SQLite connection pool used for blob metadata and tickets.
    pub db: Arc<SqlitePool>,

    /// Base directory on disk where blob payloads are stored.
    pub base_path: PathBuf,

    /// Externally reachable origin used to build upload and blob URLs.
    public_url: String,

    upload_ttl: Duration,
    max_upload_bytes: u64,
    feed: ChangeFeed,
}

impl StorageService {
    pub fn new(
        db: Arc<SqlitePool>,
        base_path: impl Into<PathBuf>,
        public_url: impl Into<String>,
        feed: ChangeFeed,
    ) -> Self {
        Self {
            db,
            base_path: base_path.into(),
            public_url: public_url.into().trim_end_matches('/').to_string(),
            upload_ttl: Duration::seconds(DEFAULT_UPLOAD_TTL_SECS),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            feed,
        }
    }

    /// How long a generated upload URL stays usable.
    pub fn with_upload_ttl(mut self, ttl: Duration) -> Self {
        self.upload_ttl = ttl;
        self
    }

    pub fn with_max_upload_bytes(mut self, limit: u64) -> Self {
        self.max_upload_bytes = limit;
        self
    }

    fn upload_url(&self, token: Uuid) -> String {
        format!("{}/api/storage/upload/{}", self.public_url, token)
    }

    fn blob_url(&self, id: Uuid) -> String {
        format!("{}/api/storage/{}", self.public_url, id)
    }

    /// Two-level shard directories from MD5(blob id), first two bytes as hex.
    fn blob_shards(id: Uuid) -> (String, String) {
        let digest = md5::compute(id.as_bytes());
        (format!("{:02x}", digest[0]), format!("{:02x}", digest[1]))
    }

    fn blob_path(&self, id: Uuid) -> PathBuf {
        let (shard_a, shard_b) = Self::blob_shards(id);
        let mut path = self.base_path.clone();
        path.push(shard_a);
        path.push(shard_b);
        path.push(id.to_string());
        path
    }

    /// Issue a one-time upload URL valid for the configured TTL.
    ///
    /// Expired tickets that were never redeemed are purged first, so the
    /// table holds at most the tickets still usable.
    pub async fn generate_upload_url(&self) -> StorageResult<String> {
        let now = Utc::now();
        let purged = sqlx::query("DELETE FROM upload_tickets WHERE expires_at <= ?")
            .bind(now)
            .execute(&*self.db)
            .await?
            .rows_affected();
        if purged > 0 {
            debug!("purged {} expired upload tickets", purged);
        }

        let token = Uuid::new_v4();
        let expires_at = now + self.upload_ttl;

        sqlx::query("INSERT INTO upload_tickets (token, expires_at) VALUES (?, ?)")
            .bind(token)
            .bind(expires_at)
            .execute(&*self.db)
            .await?;

        debug!("issued upload ticket {} expiring at {}", token, expires_at);
        Ok(self.upload_url(token))
    }

    /// Redeem an upload ticket. The row is deleted whether or not it has
    /// expired, so a URL can never be used twice.
    async fn consume_ticket(&self, token: Uuid) -> StorageResult<()> {
        let expires_at: Option<DateTime<Utc>> =
            sqlx::query_scalar("DELETE FROM upload_tickets WHERE token = ? RETURNING expires_at")
                .bind(token)
                .fetch_optional(&*self.db)
                .await?;

        match expires_at {
            None => Err(StorageError::UploadUrlNotFound),
            Some(at) if at <= Utc::now() => Err(StorageError::UploadUrlExpired),
            Some(_) => Ok(()),
        }
    }

    /// Stream an upload to disk and record its metadata.
    ///
    /// - Consumes the ticket first so concurrent uses of one URL fail fast.
    /// - Writes to a temp file while computing MD5 and size, then renames.
    /// - Aborts with `PayloadTooLarge` as soon as the limit is crossed.
    ///
    /// Temp files are removed on every error path.
    pub async fn accept_upload<S>(
        &self,
        token: Uuid,
        content_type: Option<String>,
        stream: S,
    ) -> StorageResult<Blob>
    where
        S: Stream<Item = io::Result<Bytes>> + Send + 'static,
    {
        self.consume_ticket(token).await?;

        let id = Uuid::new_v4();
        let file_path = self.blob_path(id);
        let parent = file_path.parent().map(Path::to_path_buf).ok_or_else(|| {
            StorageError::Io(io::Error::other("blob path missing parent directory"))
        })?;
        fs::create_dir_all(&parent).await?;
        let tmp_path = parent.join(format!(".tmp-{}", Uuid::new_v4()));
        let mut file = File::create(&tmp_path).await?;

        let mut size_bytes: u64 = 0;
        let mut digest = Context::new();
        pin_mut!(stream);
        while let Some(chunk_res) = stream.next().await {
            let chunk = match chunk_res {
                Ok(chunk) => chunk,
                Err(err) => {
                    let _ = fs::remove_file(&tmp_path).await;
                    return Err(StorageError::Io(err));
                }
            };
            size_bytes += chunk.len() as u64;
            if size_bytes > self.max_upload_bytes {
                let _ = fs::remove_file(&tmp_path).await;
                return Err(StorageError::PayloadTooLarge {
                    limit: self.max_upload_bytes,
                });
            }
            digest.consume(&chunk);
            if let Err(err) = file.write_all(&chunk).await {
                let _ = fs::remove_file(&tmp_path).await;
                return Err(StorageError::Io(err));
            }
        }
        if let Err(err) = file.sync_all().await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(StorageError::Io(err));
        }
        drop(file);

        if let Err(err) = fs::rename(&tmp_path, &file_path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(StorageError::Io(err));
        }

        let blob = Blob {
            id,
            content_type,
            size_bytes: size_bytes as i64,
            etag: format!("{:x}", digest.compute()),
            created_at: Utc::now(),
        };

        let insert = sqlx::query(
            "INSERT INTO blobs (id, content_type, size_bytes, etag, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(blob.id)
        .bind(&blob.content_type)
        .bind(blob.size_bytes)
        .bind(&blob.etag)
        .bind(blob.created_at)
        .execute(&*self.db)
        .await;

        if let Err(err) = insert {
            let _ = fs::remove_file(&file_path).await;
            return Err(StorageError::Sqlx(err));
        }

        info!(
            "stored blob {} ({} bytes, {:?})",
            blob.id, blob.size_bytes, blob.content_type
        );
        self.feed.publish(Topic::Blobs);
        Ok(blob)
    }

    async fn fetch_blob(&self, id: Uuid) -> StorageResult<Option<Blob>> {
        let blob = sqlx::query_as::<_, Blob>(
            "SELECT id, content_type, size_bytes, etag, created_at FROM blobs WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&*self.db)
        .await?;
        Ok(blob)
    }

    /// Resolve a storage id to a fetchable URL.
    ///
    /// Ids that are malformed or name no stored blob resolve to `None`. The
    /// URL is derived from the id alone, so repeated calls agree.
    pub async fn resolve_url(&self, storage_id: &str) -> StorageResult<Option<String>> {
        let Ok(id) = Uuid::parse_str(storage_id) else {
            return Ok(None);
        };
        Ok(self.fetch_blob(id).await?.map(|blob| self.blob_url(blob.id)))
    }

    /// Open a stored blob for streaming out.
    ///
    /// Returns BlobNotFound if the metadata row or the payload file is missing.
    pub async fn open_blob(&self, storage_id: &str) -> StorageResult<(Blob, File)> {
        let not_found = || StorageError::BlobNotFound(storage_id.to_string());
        let id = Uuid::parse_str(storage_id).map_err(|_| not_found())?;
        let blob = self.fetch_blob(id).await?.ok_or_else(not_found)?;

        let file = File::open(self.blob_path(id)).await.map_err(|err| {
            if err.kind() == ErrorKind::NotFound {
                not_found()
            } else {
                StorageError::Io(err)
            }
        })?;

        Ok((blob, file))
    }
}
