//! Health check endpoints for liveness and readiness probes.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::errors::ApiResponse;
use crate::AppState;

/// Readiness probe detail.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub report_store: String,
}

/// Liveness probe. Always returns OK if the process is running.
pub async fn live() -> &'static str {
    "OK"
}

/// Readiness probe. Checks report store connectivity; 503 when unreachable.
pub async fn ready(
    State(state): State<AppState>,
) -> (StatusCode, Json<ApiResponse<HealthStatus>>) {
    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            ApiResponse::success(HealthStatus {
                status: "ok".to_string(),
                report_store: "connected".to_string(),
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Report store health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                ApiResponse::error("UNAVAILABLE", &format!("Report store: {e}")),
            )
        }
    }
}
