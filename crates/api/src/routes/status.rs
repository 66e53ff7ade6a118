//! Liveness and readiness probes.

use axum::extract::State;
use serde::Serialize;

use crate::app::AppState;
use crate::error::ApiError;
use crate::response::ApiResponse;

#[derive(Debug, Serialize)]
pub struct LiveResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub database: DatabaseHealth,
}

#[derive(Debug, Serialize)]
pub struct DatabaseHealth {
    pub connected: bool,
    pub latency_ms: u64,
}

/// GET /api/status/live
pub async fn live() -> ApiResponse<LiveResponse> {
    ApiResponse::ok(LiveResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /api/status/ready
///
/// 503 while the database is unreachable.
pub async fn ready(State(state): State<AppState>) -> Result<ApiResponse<ReadyResponse>, ApiError> {
    let start = std::time::Instant::now();
    persistence::db::ping(&state.pool).await.map_err(|e| {
        tracing::warn!(error = %e, "Readiness check failed");
        ApiError::ServiceUnavailable("Database unavailable".to_string())
    })?;

    Ok(ApiResponse::ok(ReadyResponse {
        status: "ready",
        database: DatabaseHealth {
            connected: true,
            latency_ms: start.elapsed().as_millis() as u64,
        },
    }))
}
