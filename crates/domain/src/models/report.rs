//! Citizen pollution report models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// Maximum ids accepted by one bulk transition.
pub const MAX_BULK_IDS: usize = 500;

/// Page size cap for report listings.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Report review status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Pending,
    Verified,
    Rejected,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "pending",
            ReportStatus::Verified => "verified",
            ReportStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for ReportStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(ReportStatus::Pending),
            "verified" => Ok(ReportStatus::Verified),
            "rejected" => Ok(ReportStatus::Rejected),
            _ => Err(format!("Invalid report status: {}", s)),
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Review action taken by an admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportAction {
    Verify,
    Reject,
}

impl ReportAction {
    pub fn target_status(&self) -> ReportStatus {
        match self {
            ReportAction::Verify => ReportStatus::Verified,
            ReportAction::Reject => ReportStatus::Rejected,
        }
    }
}

impl FromStr for ReportAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "verify" => Ok(ReportAction::Verify),
            "reject" => Ok(ReportAction::Reject),
            _ => Err(format!("Invalid report action: {}", s)),
        }
    }
}

/// A stored report joined with its display names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollutionReport {
    pub id: i64,
    pub user_id: i64,
    pub username: Option<String>,
    pub district_id: i64,
    pub district_name: String,
    pub address: String,
    pub pollution_type_id: i64,
    pub pollution_type_code: String,
    pub pollution_type_name: String,
    pub custom_type: Option<String>,
    pub description: String,
    pub media_url: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub status: ReportStatus,
    pub verified_by: Option<i64>,
    pub verified_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Request payload for filing a report.
///
/// District and pollution type are given by their external keys (district
/// name, type code) and resolved by the store.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateReportRequest {
    #[validate(length(min = 1, max = 100, message = "District is required"))]
    pub district: String,

    #[validate(length(min = 1, max = 255, message = "Address is required"))]
    pub address: String,

    #[validate(length(min = 1, max = 50, message = "Pollution type is required"))]
    pub pollution_type: String,

    #[validate(length(max = 100, message = "Custom type must be at most 100 characters"))]
    pub custom_type: Option<String>,

    #[validate(length(
        min = 1,
        max = 5000,
        message = "Description must be between 1 and 5000 characters"
    ))]
    pub description: String,

    #[validate(url(message = "Media URL must be a valid URL"))]
    pub media_url: Option<String>,

    #[validate(custom(function = "crate::models::report::validate_optional_latitude"))]
    pub latitude: Option<f64>,

    #[validate(custom(function = "crate::models::report::validate_optional_longitude"))]
    pub longitude: Option<f64>,
}

impl CreateReportRequest {
    /// Trims text fields. Whitespace-only required text becomes empty and
    /// fails validation.
    pub fn normalized(mut self) -> Self {
        self.district = self.district.trim().to_string();
        self.address = self.address.trim().to_string();
        self.pollution_type = self.pollution_type.trim().to_lowercase();
        self.description = self.description.trim().to_string();
        self.custom_type = self
            .custom_type
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        self.media_url = self
            .media_url
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty());
        self
    }
}

/// Validates optional latitude.
pub fn validate_optional_latitude(lat: f64) -> Result<(), validator::ValidationError> {
    shared::validation::validate_latitude(lat)
}

/// Validates optional longitude.
pub fn validate_optional_longitude(lon: f64) -> Result<(), validator::ValidationError> {
    shared::validation::validate_longitude(lon)
}

/// Optional body of a single transition.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct TransitionReportRequest {
    #[validate(length(max = 1000, message = "Reason must be at most 1000 characters"))]
    pub reason: Option<String>,
}

/// Bulk transition body: `{ids, status, reason}`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BulkTransitionRequest {
    pub ids: Vec<i64>,
    pub status: ReportStatus,
    #[validate(length(max = 1000, message = "Reason must be at most 1000 characters"))]
    pub reason: Option<String>,
}

impl BulkTransitionRequest {
    /// Returns the deduplicated, positive ids, or a message describing why
    /// the list is unusable.
    pub fn validated_ids(&self) -> Result<Vec<i64>, String> {
        if self.status == ReportStatus::Pending {
            return Err("Bulk status must be verified or rejected".to_string());
        }
        if self.ids.is_empty() {
            return Err("ids must not be empty".to_string());
        }
        if self.ids.iter().any(|id| *id <= 0) {
            return Err("ids must be positive integers".to_string());
        }
        let mut ids = self.ids.clone();
        ids.sort_unstable();
        ids.dedup();
        if ids.len() > MAX_BULK_IDS {
            return Err(format!("At most {} ids per request", MAX_BULK_IDS));
        }
        Ok(ids)
    }
}

/// Result of a transition.
#[derive(Debug, Clone, Serialize)]
pub struct TransitionOutcome {
    pub updated: u64,
    pub status: ReportStatus,
}

/// Report listing filters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportListQuery {
    pub id: Option<i64>,
    pub status: Option<ReportStatus>,
    pub district_id: Option<i64>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl ReportListQuery {
    /// Returns `(limit, offset)` with limit clamped to `1..=100`.
    pub fn page_bounds(&self) -> (i64, i64) {
        let limit = self.limit.unwrap_or(20).clamp(1, MAX_PAGE_SIZE);
        let page = self.page.unwrap_or(1).max(1);
        (limit, (page - 1).saturating_mul(limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_request() -> CreateReportRequest {
        CreateReportRequest {
            district: "Cầu Giấy".into(),
            address: "144 Xuân Thủy".into(),
            pollution_type: "burning".into(),
            custom_type: None,
            description: "Open burning of trash".into(),
            media_url: None,
            latitude: Some(21.036),
            longitude: Some(105.782),
        }
    }

    #[test]
    fn test_status_roundtrip() {
        assert_eq!(ReportStatus::from_str("VERIFIED").unwrap(), ReportStatus::Verified);
        assert_eq!(ReportStatus::Rejected.to_string(), "rejected");
        assert!(ReportStatus::from_str("closed").is_err());
    }

    #[test]
    fn test_action_target() {
        assert_eq!(ReportAction::Verify.target_status(), ReportStatus::Verified);
        assert_eq!(
            ReportAction::from_str("reject").unwrap().target_status(),
            ReportStatus::Rejected
        );
        assert!(ReportAction::from_str("approve").is_err());
    }

    #[test]
    fn test_create_request_validation() {
        assert!(create_request().validate().is_ok());

        let mut blank = create_request();
        blank.description = "   ".into();
        assert!(blank.normalized().validate().is_err());

        let mut bad_lat = create_request();
        bad_lat.latitude = Some(123.0);
        assert!(bad_lat.validate().is_err());

        let mut bad_url = create_request();
        bad_url.media_url = Some("not a url".into());
        assert!(bad_url.validate().is_err());
    }

    #[test]
    fn test_normalized_lowercases_type() {
        let mut req = create_request();
        req.pollution_type = " Burning ".into();
        req.custom_type = Some("  ".into());
        let req = req.normalized();
        assert_eq!(req.pollution_type, "burning");
        assert_eq!(req.custom_type, None);
    }

    #[test]
    fn test_bulk_ids() {
        let req = BulkTransitionRequest {
            ids: vec![3, 1, 3, 2],
            status: ReportStatus::Verified,
            reason: None,
        };
        assert_eq!(req.validated_ids().unwrap(), vec![1, 2, 3]);

        let empty = BulkTransitionRequest {
            ids: vec![],
            status: ReportStatus::Rejected,
            reason: None,
        };
        assert!(empty.validated_ids().is_err());

        let pending = BulkTransitionRequest {
            ids: vec![1],
            status: ReportStatus::Pending,
            reason: None,
        };
        assert!(pending.validated_ids().is_err());

        let negative = BulkTransitionRequest {
            ids: vec![1, -4],
            status: ReportStatus::Verified,
            reason: None,
        };
        assert!(negative.validated_ids().is_err());

        let too_many = BulkTransitionRequest {
            ids: (1..=(MAX_BULK_IDS as i64 + 1)).collect(),
            status: ReportStatus::Verified,
            reason: None,
        };
        assert!(too_many.validated_ids().is_err());
    }

    #[test]
    fn test_page_bounds() {
        assert_eq!(ReportListQuery::default().page_bounds(), (20, 0));
        let q = ReportListQuery {
            page: Some(3),
            limit: Some(500),
            ..Default::default()
        };
        assert_eq!(q.page_bounds(), (100, 200));
    }

    #[test]
    fn test_page_bounds_huge_page_saturates() {
        let q = ReportListQuery {
            page: Some(i64::MAX),
            limit: Some(20),
            ..Default::default()
        };
        assert_eq!(q.page_bounds(), (20, i64::MAX));
    }
}
