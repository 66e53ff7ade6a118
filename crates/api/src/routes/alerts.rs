//! Manual trigger for AQI alert evaluation.
//!
//! POST /api/alerts?action=run   (admin)

use axum::extract::{Query, State};
use domain::models::AlertRunSummary;
use serde::Deserialize;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AdminUser;
use crate::jobs::AlertEvaluator;
use crate::response::ApiResponse;

#[derive(Debug, Deserialize)]
pub struct AlertsQuery {
    pub action: Option<String>,
}

pub async fn run_alerts(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Query(query): Query<AlertsQuery>,
) -> Result<ApiResponse<AlertRunSummary>, ApiError> {
    match query.action.as_deref() {
        Some("run") => {}
        Some(other) => return Err(ApiError::Validation(format!("Invalid action: {}", other))),
        None => return Err(ApiError::Validation("action is required".to_string())),
    }

    tracing::info!(admin_id = admin.id, "Alert run requested");
    let summary = AlertEvaluator::new(state.pool.clone(), state.notifier.clone())
        .run()
        .await?;
    Ok(ApiResponse::ok(summary))
}
