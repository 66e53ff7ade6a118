//! User settings entity.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Settings row joined with the chosen district name.
#[derive(Debug, Clone, FromRow)]
pub struct UserSettingsEntity {
    pub user_id: i64,
    pub alert_threshold: i32,
    pub email_alerts: bool,
    pub sms_alerts: bool,
    pub locale: String,
    pub temperature_unit: String,
    pub district_id: Option<i64>,
    pub district_name: Option<String>,
    pub phone: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserSettingsEntity> for domain::models::UserSettings {
    fn from(entity: UserSettingsEntity) -> Self {
        Self {
            user_id: entity.user_id,
            alert_threshold: entity.alert_threshold,
            email_alerts: entity.email_alerts,
            sms_alerts: entity.sms_alerts,
            locale: entity.locale,
            temperature_unit: entity.temperature_unit,
            district_id: entity.district_id,
            district_name: entity.district_name,
            phone: entity.phone,
            updated_at: entity.updated_at,
        }
    }
}
