//! Per-user settings.
//!
//! GET /api/settings   (created with defaults on first read)
//! PUT /api/settings   partial update

use axum::{extract::State, Json};
use domain::models::{DistrictRef, UpdateSettingsRequest, UserSettings};
use persistence::repositories::{ReferenceRepository, SettingsChanges, UserSettingsRepository};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentUser;
use crate::response::ApiResponse;

pub async fn get_settings(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<ApiResponse<UserSettings>, ApiError> {
    let settings = UserSettingsRepository::new(state.pool.clone())
        .get_or_create(user.id)
        .await?;
    Ok(ApiResponse::ok(settings.into()))
}

pub async fn update_settings(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<UpdateSettingsRequest>,
) -> Result<ApiResponse<UserSettings>, ApiError> {
    request.validate()?;
    request.check_phone().map_err(|e| {
        ApiError::Validation(
            e.message
                .map(|m| m.to_string())
                .unwrap_or_else(|| "Invalid phone number".to_string()),
        )
    })?;

    let district_id = match &request.district {
        None => None,
        Some(None) => Some(None),
        Some(Some(district)) => Some(Some(resolve_district(&state, district).await?)),
    };

    let changes = SettingsChanges {
        alert_threshold: request.alert_threshold,
        email_alerts: request.email_alerts,
        sms_alerts: request.sms_alerts,
        locale: request.locale.as_deref(),
        temperature_unit: request.temperature_unit.as_deref(),
        district_id,
        phone: request
            .phone
            .as_ref()
            .map(|p| p.as_deref().map(str::trim).filter(|p| !p.is_empty())),
    };

    let settings = UserSettingsRepository::new(state.pool.clone())
        .update(user.id, &changes)
        .await?;

    tracing::info!(user_id = user.id, "Settings updated");
    Ok(ApiResponse::ok(settings.into()))
}

async fn resolve_district(state: &AppState, district: &DistrictRef) -> Result<i64, ApiError> {
    let reference = ReferenceRepository::new(state.pool.clone());
    let found = match district {
        DistrictRef::Id(id) => reference.find_district(*id).await?,
        DistrictRef::Name(name) => reference.find_district_by_name(name).await?,
    };
    found.map(|d| d.id).ok_or_else(|| match district {
        DistrictRef::Id(id) => ApiError::Validation(format!("Unknown district: {}", id)),
        DistrictRef::Name(name) => ApiError::Validation(format!("Unknown district: {}", name)),
    })
}
