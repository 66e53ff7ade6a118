//! Domain models for the air-quality platform.

pub mod alert;
pub mod aqi;
pub mod district;
pub mod health_log;
pub mod ingestion;
pub mod measurement;
pub mod news;
pub mod newsletter;
pub mod pollution_type;
pub mod report;
pub mod system_settings;
pub mod user;
pub mod user_settings;

pub use alert::{AlertCandidate, AlertNotification, AlertRunSummary};
pub use aqi::{AqiScale, AqiScaleBucket, ScaleError};
pub use district::{District, DistrictDirectory};
pub use health_log::{CreateHealthLogRequest, HealthLog, HealthLogQuery};
pub use ingestion::{IngestError, IngestKind, IngestSummary, NormalizedRow, RawRow, RowError};
pub use measurement::{
    ForecastEntry, ForecastInput, ForecastQuery, LatestReading, ReadingInput, SourceTag,
};
pub use news::{CreateNewsRequest, ExternalArticle, FetchSummary, NewsItem, NewsListQuery};
pub use newsletter::{
    NewsletterSubscriber, SubscribeOutcome, SubscribeRequest, SubscribeResponse,
    SubscriberStatus, UnsubscribeRequest,
};
pub use pollution_type::PollutionType;
pub use report::{
    BulkTransitionRequest, CreateReportRequest, PollutionReport, ReportAction, ReportListQuery,
    ReportStatus, TransitionOutcome, TransitionReportRequest,
};
pub use system_settings::{SystemSettings, UpdateSystemSettingsRequest};
pub use user::{
    AdminAction, CreateUserRequest, LoginRequest, RegisterRequest, Role, UpdateUserRequest, User,
    UserListQuery,
};
pub use user_settings::{DistrictRef, UpdateSettingsRequest, UserSettings};
