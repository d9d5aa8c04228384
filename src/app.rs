//! Composition root: wires the database, services, feed and identity
//! provider into the shared state every handler receives.

use crate::{
    config::AppConfig,
    identity::IdentityProvider,
    services::{
        change_feed::ChangeFeed, gallery_service::GalleryService, storage_service::StorageService,
    },
};
use chrono::Duration;
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub gallery: GalleryService,
    pub storage: StorageService,
    pub feed: ChangeFeed,
    pub identity: Arc<dyn IdentityProvider>,
}

impl AppState {
    pub fn new(db: Arc<SqlitePool>, cfg: &AppConfig) -> Self {
        let identity = cfg.identity.provider();
        Self::with_identity(db, cfg, identity)
    }

    /// Build state with an explicitly supplied identity provider.
    pub fn with_identity(
        db: Arc<SqlitePool>,
        cfg: &AppConfig,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        let feed = ChangeFeed::default();
        let storage = StorageService::new(
            db.clone(),
            cfg.storage_dir.clone(),
            cfg.public_url.clone(),
            feed.clone(),
        )
        .with_upload_ttl(Duration::seconds(cfg.upload_url_ttl_secs))
        .with_max_upload_bytes(cfg.max_upload_bytes);
        let gallery = GalleryService::new(db, storage.clone(), feed.clone());

        Self {
            gallery,
            storage,
            feed,
            identity,
        }
    }
}
