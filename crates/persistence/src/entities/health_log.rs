use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct HealthLogEntity {
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

impl From<HealthLogEntity> for domain::models::HealthLog {
    fn from(entity: HealthLogEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            log_date: entity.log_date,
            symptoms: entity.symptoms,
            severity: entity.severity,
            note: entity.note,
            aqi_snapshot: entity.aqi_snapshot,
            district_id: entity.district_id,
            district_name: entity.district_name,
            created_at: entity.created_at,
        }
    }
}
