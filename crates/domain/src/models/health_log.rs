//! Personal health log entries.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Maximum symptom tags per entry.
pub const MAX_SYMPTOMS: usize = 20;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthLog {
    pub id: i64,
    pub user_id: i64,
    pub log_date: NaiveDate,
    pub symptoms: Vec<String>,
    pub severity: i16,
    pub note: Option<String>,
    pub aqi_snapshot: Option<i32>,
    pub district_id: Option<i64>,
    pub district_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateHealthLogRequest {
    /// Defaults to today when absent.
    pub log_date: Option<NaiveDate>,

    #[serde(default)]
    pub symptoms: Vec<String>,

    #[validate(range(min = 1, max = 5, message = "Severity must be between 1 and 5"))]
    pub severity: i16,

    #[validate(length(max = 2000, message = "Note must be at most 2000 characters"))]
    pub note: Option<String>,

    pub district_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HealthLogQuery {
    pub limit: Option<i64>,
}

impl HealthLogQuery {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(30).clamp(1, 365)
    }
}

/// Trims, lowercases and deduplicates symptom tags, dropping blanks.
pub fn normalize_symptoms(symptoms: &[String]) -> Result<Vec<String>, String> {
    let mut tags: Vec<String> = Vec::new();
    for raw in symptoms {
        let tag = raw.trim().to_lowercase();
        if tag.is_empty() || tags.contains(&tag) {
            continue;
        }
        if tag.chars().count() > 50 {
            return Err(format!("Symptom too long: {}", raw.trim()));
        }
        tags.push(tag);
    }
    if tags.len() > MAX_SYMPTOMS {
        return Err(format!("At most {} symptoms per entry", MAX_SYMPTOMS));
    }
    Ok(tags)
}
