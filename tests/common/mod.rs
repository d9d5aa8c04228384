#![allow(dead_code)]

use event_gallery::{
    app::AppState,
    config::{AppConfig, Args},
    db, routes,
};
use std::{env, sync::Arc};
use tempfile::TempDir;
use tokio::net::TcpListener;

/// A gallery server on an ephemeral port with a private database and blob dir.
pub struct TestServer {
    pub base_url: String,
    pub state: AppState,
    _blobs: TempDir,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

pub async fn spawn() -> TestServer {
    spawn_with(|_| {}).await
}

pub async fn spawn_with(configure: impl FnOnce(&mut AppConfig)) -> TestServer {
    let blobs = TempDir::new().expect("tempdir");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");

    let mut cfg = AppConfig::resolve(Args::default(), |_: &str| Err(env::VarError::NotPresent))
        .expect("default config");
    cfg.host = addr.ip().to_string();
    cfg.port = addr.port();
    cfg.storage_dir = blobs.path().display().to_string();
    cfg.database_url = "sqlite::memory:".into();
    cfg.public_url = format!("http://{}", addr);
    configure(&mut cfg);

    let pool = db::connect(&cfg.database_url).await.expect("database");
    let state = AppState::new(Arc::new(pool), &cfg);
    let app = routes::routes::routes(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });

    TestServer {
        base_url: cfg.public_url.clone(),
        state,
        _blobs: blobs,
    }
}
