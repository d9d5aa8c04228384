//! Health & readiness handlers.
//!
//! - GET /healthz  -> simple liveness ("ok")
//! - GET /readyz   -> readiness that checks the database and blob directory

use crate::app::AppState;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::SqlitePool;
use std::{collections::BTreeMap, path::Path};
use tokio::fs;
use uuid::Uuid;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub checks: BTreeMap<&'static str, CheckStatus>,
}

#[derive(Serialize)]
pub struct CheckStatus {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CheckStatus {
    fn passed() -> Self {
        Self {
            ok: true,
            error: None,
        }
    }

    fn failed(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(error.into()),
        }
    }
}

/// `GET /healthz`
///
/// Liveness only; performs no I/O.
pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "ok" }))
}

/// `GET /readyz`
///
/// 200 when both the database and the blob directory respond, 503 otherwise.
pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    let mut checks = BTreeMap::new();
    checks.insert("sqlite", probe_database(&state.storage.db).await);
    checks.insert("blobs", probe_blob_dir(&state.storage.base_path).await);

    let ready = checks.values().all(|check| check.ok);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let body = ReadyResponse {
        status: if ready { "ok" } else { "error" },
        checks,
    };
    (status, Json(body))
}

async fn probe_database(db: &SqlitePool) -> CheckStatus {
    match sqlx::query_scalar::<_, i64>("SELECT 1").fetch_one(db).await {
        Ok(1) => CheckStatus::passed(),
        Ok(other) => CheckStatus::failed(format!("unexpected result: {}", other)),
        Err(err) => CheckStatus::failed(format!("error: {}", err)),
    }
}

/// Write, read back and delete a scratch file in the blob directory.
async fn probe_blob_dir(base_path: &Path) -> CheckStatus {
    let probe = base_path.join(format!(".readyz-{}", Uuid::new_v4()));
    if let Err(err) = fs::write(&probe, b"readyz").await {
        return CheckStatus::failed(format!("could not write probe file: {}", err));
    }
    let read_back = fs::read(&probe).await;
    let _ = fs::remove_file(&probe).await;
    match read_back {
        Ok(bytes) if bytes == b"readyz" => CheckStatus::passed(),
        Ok(_) => CheckStatus::failed("probe file content mismatch"),
        Err(err) => CheckStatus::failed(format!("could not read probe file: {}", err)),
    }
}
