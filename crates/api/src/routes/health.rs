//! Personal health logs.
//!
//! GET  /api/health[?limit=]
//! POST /api/health

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{FixedOffset, Offset, Utc};
use domain::models::health_log::normalize_symptoms;
use domain::models::{CreateHealthLogRequest, HealthLog, HealthLogQuery};
use persistence::repositories::{HealthLogRepository, ReferenceRepository, UserSettingsRepository};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentUser;
use crate::response::ApiResponse;

pub async fn list_health_logs(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<HealthLogQuery>,
) -> Result<ApiResponse<Vec<HealthLog>>, ApiError> {
    let logs = HealthLogRepository::new(state.pool.clone())
        .list_for_user(user.id, query.limit())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(ApiResponse::ok(logs))
}

/// Creates an entry with the latest AQI of the given district, falling back
/// to the district from the caller's settings.
pub async fn create_health_log(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<CreateHealthLogRequest>,
) -> Result<ApiResponse<HealthLog>, ApiError> {
    request.validate()?;
    let symptoms = normalize_symptoms(&request.symptoms).map_err(ApiError::Validation)?;

    let district_id = match request.district_id {
        Some(id) => {
            ReferenceRepository::new(state.pool.clone())
                .find_district(id)
                .await?
                .ok_or_else(|| ApiError::Validation(format!("Unknown district: {}", id)))?;
            Some(id)
        }
        None => {
            UserSettingsRepository::new(state.pool.clone())
                .get_or_create(user.id)
                .await?
                .district_id
        }
    };

    let log_date = match request.log_date {
        Some(date) => date,
        None => {
            let hours = state.config.limits.ingest_utc_offset_hours;
            let offset =
                FixedOffset::east_opt(hours.saturating_mul(3600)).unwrap_or_else(|| Utc.fix());
            Utc::now().with_timezone(&offset).date_naive()
        }
    };
    let note = request
        .note
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());

    let log: HealthLog = HealthLogRepository::new(state.pool.clone())
        .create(user.id, log_date, &symptoms, request.severity, note, district_id)
        .await?
        .into();

    tracing::info!(
        user_id = user.id,
        log_id = log.id,
        severity = log.severity,
        aqi_snapshot = ?log.aqi_snapshot,
        "Health log created"
    );
    Ok(ApiResponse::created(log))
}
