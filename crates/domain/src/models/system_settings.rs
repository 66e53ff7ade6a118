//! Global platform settings (singleton row).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemSettings {
    pub maintenance_mode: bool,
    pub refresh_interval: String,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateSystemSettingsRequest {
    pub maintenance_mode: Option<bool>,

    #[validate(custom(function = "shared::validation::validate_refresh_interval"))]
    pub refresh_interval: Option<String>,
}

impl UpdateSystemSettingsRequest {
    pub fn is_empty(&self) -> bool {
        self.maintenance_mode.is_none() && self.refresh_interval.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_interval_validated() {
        let ok = UpdateSystemSettingsRequest {
            maintenance_mode: None,
            refresh_interval: Some("10m".into()),
        };
        assert!(ok.validate().is_ok());

        let bad = UpdateSystemSettingsRequest {
            maintenance_mode: None,
            refresh_interval: Some("ten minutes".into()),
        };
        assert!(bad.validate().is_err());
        assert!(UpdateSystemSettingsRequest::default().is_empty());
    }
}
