//! Health endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tracing::warn;

use crate::AppState;

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
    pub database: bool,
    pub migrations_applied: Option<usize>,
    pub migrations_total: Option<usize>,
}

/// `GET /health`: 200 when the database answers, 503 otherwise.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthStatus>) {
    let database = state.db.health_check().await;

    let (applied, total) = match state.db.migration_status().await {
        Ok((total, applied)) => (Some(applied), Some(total)),
        Err(e) => {
            warn!(error = %e, "Could not read migration status");
            (None, None)
        }
    };

    let (code, status) = if database {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
    };

    (
        code,
        Json(HealthStatus {
            status,
            version: env!("CARGO_PKG_VERSION"),
            database,
            migrations_applied: applied,
            migrations_total: total,
        }),
    )
}
