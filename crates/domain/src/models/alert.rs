//! AQI alert evaluation models.

use serde::Serialize;

/// A subscribed user joined with the latest reading of their district.
#[derive(Debug, Clone)]
pub struct AlertCandidate {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub threshold: i32,
    pub district_name: String,
    pub aqi: Option<i32>,
    pub pm25: Option<f64>,
    pub temperature: Option<f64>,
}

impl AlertCandidate {
    /// Builds the notification when the latest AQI is at or above the
    /// threshold. Candidates without any reading are skipped.
    pub fn evaluate(&self) -> Option<AlertNotification> {
        let aqi = self.aqi?;
        if aqi < self.threshold {
            return None;
        }
        Some(AlertNotification {
            email: self.email.clone(),
            username: self.username.clone(),
            district: self.district_name.clone(),
            aqi,
            threshold: self.threshold,
            pm25: self.pm25,
            temperature: self.temperature,
        })
    }
}

/// Payload handed to the notification dispatcher.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertNotification {
    pub email: String,
    pub username: String,
    pub district: String,
    pub aqi: i32,
    pub threshold: i32,
    pub pm25: Option<f64>,
    pub temperature: Option<f64>,
}

/// Per-run totals.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct AlertRunSummary {
    pub checked: usize,
    pub triggered: usize,
    pub sent: usize,
    pub failed: usize,
    pub failures: Vec<String>,
}
