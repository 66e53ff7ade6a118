//! Application services and external integrations.

pub mod admin_bootstrap;
pub mod auth;
pub mod email;
pub mod ingestion;
pub mod news_source;

pub use admin_bootstrap::{bootstrap_admin, BootstrapOutcome};
pub use auth::{AuthError, AuthResult, AuthService};
pub use email::{EmailAlertNotifier, EmailService};
pub use ingestion::IngestionService;
pub use news_source::{NewsApiClient, NewsSource, NewsSourceError};
