//! Air-quality readings and forecasts.
//!
//! GET  /api/air_quality?type=realtime|forecast[&district_id=][&limit=]
//! POST /api/air_quality?action=upload_realtime|upload_forecast  (admin)

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use domain::models::{ForecastEntry, ForecastQuery, IngestKind, IngestSummary, LatestReading};
use persistence::repositories::MeasurementRepository;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AdminUser;
use crate::response::ApiResponse;
use crate::services::IngestionService;

#[derive(Debug, Deserialize)]
pub struct AirQualityQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub district_id: Option<i64>,
    /// Forecast horizon in days.
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum AirQualityData {
    Realtime(Vec<LatestReading>),
    Forecast(Vec<ForecastEntry>),
}

pub async fn get_air_quality(
    State(state): State<AppState>,
    Query(query): Query<AirQualityQuery>,
) -> Result<ApiResponse<AirQualityData>, ApiError> {
    let repo = MeasurementRepository::new(state.pool.clone());

    match query.kind.as_deref().unwrap_or("realtime") {
        "realtime" => {
            let readings = repo
                .latest_readings(query.district_id)
                .await?
                .into_iter()
                .map(Into::into)
                .collect();
            Ok(ApiResponse::ok(AirQualityData::Realtime(readings)))
        }
        "forecast" => {
            let forecast = ForecastQuery::new(query.district_id, query.limit);
            let (from, to) = forecast.window(Utc::now());
            let entries = repo
                .forecasts(forecast.district_id, from, to, forecast.row_cap())
                .await?
                .into_iter()
                .map(Into::into)
                .collect();
            Ok(ApiResponse::ok(AirQualityData::Forecast(entries)))
        }
        other => Err(ApiError::Validation(format!("Invalid data type: {}", other))),
    }
}

#[derive(Debug, Deserialize)]
pub struct UploadActionQuery {
    pub action: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UploadBody {
    pub data: Vec<serde_json::Value>,
}

pub async fn post_air_quality(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Query(query): Query<UploadActionQuery>,
    Json(body): Json<UploadBody>,
) -> Result<ApiResponse<IngestSummary>, ApiError> {
    let action = query
        .action
        .ok_or_else(|| ApiError::Validation("action is required".to_string()))?;
    let kind = IngestKind::from_str(&action).map_err(ApiError::Validation)?;

    let summary = IngestionService::new(state.pool.clone(), state.config.limits.clone())
        .ingest_json(kind, &body.data)
        .await?;

    tracing::info!(
        admin_id = admin.id,
        kind = %kind,
        inserted = summary.inserted,
        errors = summary.errors.len(),
        "JSON upload processed"
    );
    Ok(ApiResponse::ok(summary))
}
