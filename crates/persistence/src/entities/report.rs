//! Pollution report entity.

use chrono::{DateTime, Utc};
use domain::models::ReportStatus;
use sqlx::FromRow;
use std::str::FromStr;

/// Report row joined with district, type and reporter names.
#[derive(Debug, Clone, FromRow)]
pub struct ReportEntity {
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
    pub status: String,
    pub verified_by: Option<i64>,
    pub verified_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ReportEntity> for domain::models::PollutionReport {
    fn from(entity: ReportEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            username: entity.username,
            district_id: entity.district_id,
            district_name: entity.district_name,
            address: entity.address,
            pollution_type_id: entity.pollution_type_id,
            pollution_type_code: entity.pollution_type_code,
            pollution_type_name: entity.pollution_type_name,
            custom_type: entity.custom_type,
            description: entity.description,
            media_url: entity.media_url,
            latitude: entity.latitude,
            longitude: entity.longitude,
            status: ReportStatus::from_str(&entity.status).unwrap_or(ReportStatus::Pending),
            verified_by: entity.verified_by,
            verified_at: entity.verified_at,
            rejection_reason: entity.rejection_reason,
            created_at: entity.created_at,
        }
    }
}
