//! Domain services for the air-quality platform.
//!
//! Services contain business logic that operates on domain models.

pub mod alerts;
pub mod ingestion;
pub mod notification;

pub use alerts::dispatch_alerts;
pub use ingestion::{parse_datetime, IngestionOptions, IngestionValidator};
pub use notification::{AlertNotifier, MockAlertNotifier, NotificationResult};
