//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod alert;
pub mod health_log;
pub mod measurement;
pub mod news;
pub mod reference;
pub mod report;
pub mod system_settings;
pub mod user;
pub mod user_settings;

pub use alert::AlertCandidateEntity;
pub use health_log::HealthLogEntity;
pub use measurement::{ForecastEntity, LatestReadingEntity};
pub use news::{NewsEntity, SubscriberEntity};
pub use reference::{AqiScaleEntity, DistrictEntity, PollutionTypeEntity};
pub use report::ReportEntity;
pub use system_settings::SystemSettingsEntity;
pub use user::UserEntity;
pub use user_settings::UserSettingsEntity;
