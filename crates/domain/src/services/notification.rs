//! Alert notification dispatch.
//!
//! The dispatcher is an edge collaborator: the API crate provides an email
//! implementation, tests use [`MockAlertNotifier`].

use std::sync::{Arc, Mutex};

use crate::models::alert::AlertNotification;

/// Result of a notification send attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationResult {
    /// Notification was handed to the transport.
    Sent,
    /// Sending failed; the run continues with the next recipient.
    Failed(String),
    /// Delivery is disabled by configuration.
    Skipped,
}

/// Sends AQI alerts to users.
#[async_trait::async_trait]
pub trait AlertNotifier: Send + Sync {
    async fn send_aqi_alert(&self, alert: &AlertNotification) -> NotificationResult;
}

/// Mock notifier for development and testing.
///
/// Records every alert it would have sent.
#[derive(Debug, Clone, Default)]
pub struct MockAlertNotifier {
    /// Whether to simulate failures for testing.
    pub simulate_failure: bool,
    /// Addresses that fail even when `simulate_failure` is off.
    pub failing_recipients: Vec<String>,
    sent: Arc<Mutex<Vec<AlertNotification>>>,
}

impl MockAlertNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock notifier that fails every send.
    pub fn failing() -> Self {
        Self {
            simulate_failure: true,
            ..Self::default()
        }
    }

    /// Create a mock notifier that fails only for the given addresses.
    pub fn failing_for(recipients: &[&str]) -> Self {
        Self {
            failing_recipients: recipients.iter().map(|r| r.to_string()).collect(),
            ..Self::default()
        }
    }

    /// Alerts recorded so far.
    pub fn sent(&self) -> Vec<AlertNotification> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl AlertNotifier for MockAlertNotifier {
    async fn send_aqi_alert(&self, alert: &AlertNotification) -> NotificationResult {
        if self.simulate_failure || self.failing_recipients.contains(&alert.email) {
            tracing::warn!(
                email = %alert.email,
                "Mock alert notifier simulating failure"
            );
            return NotificationResult::Failed("Simulated failure".to_string());
        }

        tracing::info!(
            email = %alert.email,
            district = %alert.district,
            aqi = alert.aqi,
            threshold = alert.threshold,
            "Mock: Would send AQI alert"
        );

        if let Ok(mut sent) = self.sent.lock() {
            sent.push(alert.clone());
        }
        NotificationResult::Sent
    }
}
