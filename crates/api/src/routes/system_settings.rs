//! Platform-wide settings.
//!
//! GET /api/system_settings   public
//! PUT /api/system_settings   admin

use axum::{extract::State, Json};
use domain::models::{SystemSettings, UpdateSystemSettingsRequest};
use persistence::repositories::SystemSettingsRepository;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AdminUser;
use crate::response::ApiResponse;

pub async fn get_system_settings(
    State(state): State<AppState>,
) -> Result<ApiResponse<SystemSettings>, ApiError> {
    let settings = SystemSettingsRepository::new(state.pool.clone()).get().await?;
    Ok(ApiResponse::ok(settings.into()))
}

pub async fn update_system_settings(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(request): Json<UpdateSystemSettingsRequest>,
) -> Result<ApiResponse<SystemSettings>, ApiError> {
    request.validate()?;
    if request.is_empty() {
        return Err(ApiError::Validation("No fields to update".to_string()));
    }

    let settings = SystemSettingsRepository::new(state.pool.clone())
        .update(
            request.maintenance_mode,
            request.refresh_interval.as_deref(),
            admin.id,
        )
        .await?;

    tracing::info!(
        admin_id = admin.id,
        maintenance_mode = settings.maintenance_mode,
        refresh_interval = %settings.refresh_interval,
        "System settings updated"
    );
    Ok(ApiResponse::ok(settings.into()))
}
