//! Per-user alert and display preferences.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

pub const DEFAULT_ALERT_THRESHOLD: i32 = 150;
pub const DEFAULT_LOCALE: &str = "vi";
pub const DEFAULT_TEMPERATURE_UNIT: &str = "celsius";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSettings {
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

/// District reference given either by id or by name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DistrictRef {
    Id(i64),
    Name(String),
}

/// Partial settings update. `district: null` clears the district, while an
/// absent key leaves it unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateSettingsRequest {
    #[validate(range(min = 0, max = 500, message = "Alert threshold must be between 0 and 500"))]
    pub alert_threshold: Option<i32>,

    pub email_alerts: Option<bool>,

    pub sms_alerts: Option<bool>,

    #[validate(custom(function = "shared::validation::validate_locale"))]
    pub locale: Option<String>,

    #[validate(custom(function = "shared::validation::validate_temperature_unit"))]
    pub temperature_unit: Option<String>,

    #[serde(default, deserialize_with = "deserialize_some")]
    pub district: Option<Option<DistrictRef>>,

    #[serde(default, deserialize_with = "deserialize_some")]
    pub phone: Option<Option<String>>,
}

impl UpdateSettingsRequest {
    /// Validates the nested phone value, which the derive cannot reach. A
    /// blank phone is a clear and always passes.
    pub fn check_phone(&self) -> Result<(), validator::ValidationError> {
        match &self.phone {
            Some(Some(phone)) if !phone.trim().is_empty() => {
                shared::validation::validate_phone(phone.trim())
            }
            _ => Ok(()),
        }
    }
}

/// Distinguishes an explicit `null` from a missing key.
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}
