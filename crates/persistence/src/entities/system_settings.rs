//! System settings entity.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database row mapping for the system_settings singleton.
#[derive(Debug, Clone, FromRow)]
pub struct SystemSettingsEntity {
    pub maintenance_mode: bool,
    pub refresh_interval: String,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<i64>,
}

impl From<SystemSettingsEntity> for domain::models::SystemSettings {
    fn from(entity: SystemSettingsEntity) -> Self {
        Self {
            maintenance_mode: entity.maintenance_mode,
            refresh_interval: entity.refresh_interval,
            updated_at: entity.updated_at,
            updated_by: entity.updated_by,
        }
    }
}
