//! Health & readiness handlers.
//!
//! - GET /healthz  -> liveness, never touches I/O
//! - GET /readyz   -> checks SQLite and a write/exists/delete probe on the disk

use crate::{state::AppState, storage::Disk};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use bytes::Bytes;
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

/// `GET /healthz`
pub async fn healthz() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".into(),
        }),
    )
}

/// `GET /readyz`
///
/// HTTP 200 when every check passes, 503 otherwise. The body reports each
/// check separately.
pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    let sqlite = match sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(&*state.db)
        .await
    {
        Ok(1) => CheckStatus::ok(),
        Ok(v) => CheckStatus::failed(format!("unexpected result: {v}")),
        Err(e) => CheckStatus::failed(format!("error: {e}")),
    };

    let disk = probe_disk(state.disk.as_ref()).await;

    let overall_ok = sqlite.ok && disk.ok;
    let mut checks = BTreeMap::new();
    checks.insert("sqlite", sqlite);
    checks.insert("disk", disk);

    let body = ReadyResponse {
        status: if overall_ok { "ok" } else { "error" }.into(),
        checks,
    };
    let status = if overall_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body))
}

async fn probe_disk(disk: &dyn Disk) -> CheckStatus {
    let path = format!(".readyz-{}", Uuid::new_v4());

    if let Err(e) = disk.put(&path, Bytes::from_static(b"readyz")).await {
        return CheckStatus::failed(format!("could not write probe file: {e:#}"));
    }
    let check = match disk.exists(&path).await {
        Ok(true) => CheckStatus::ok(),
        Ok(false) => CheckStatus::failed("probe file missing after write".into()),
        Err(e) => CheckStatus::failed(format!("could not stat probe file: {e:#}")),
    };
    if let Err(e) = disk.delete(&path).await {
        tracing::warn!(driver = disk.name(), error = %e, "could not remove readiness probe file");
    }
    check
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

#[derive(Serialize)]
struct ReadyResponse {
    status: String,
    checks: BTreeMap<&'static str, CheckStatus>,
}

#[derive(Serialize)]
struct CheckStatus {
    ok: bool,
    error: Option<String>,
}

impl CheckStatus {
    fn ok() -> Self {
        Self {
            ok: true,
            error: None,
        }
    }

    fn failed(error: String) -> Self {
        Self {
            ok: false,
            error: Some(error),
        }
    }
}
