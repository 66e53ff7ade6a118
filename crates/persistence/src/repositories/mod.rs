//! Repository implementations for database operations.

pub mod alert;
pub mod health_log;
pub mod measurement;
pub mod news;
pub mod newsletter;
pub mod reference;
pub mod report;
pub mod system_settings;
pub mod user;
pub mod user_settings;

pub use alert::AlertRepository;
pub use health_log::HealthLogRepository;
pub use measurement::{MeasurementRepository, UpsertResult};
pub use news::NewsRepository;
pub use newsletter::NewsletterRepository;
pub use reference::ReferenceRepository;
pub use report::{
    CreateReportOutcome, NewReport, ReportFilter, ReportRepository, TransitionOutcome,
};
pub use system_settings::SystemSettingsRepository;
pub use user::{UniqueField, UserChanges, UserFilter, UserRepository};
pub use user_settings::{SettingsChanges, UserSettingsRepository};
