//! Health log repository.

use chrono::NaiveDate;
use sqlx::PgPool;

use crate::entities::HealthLogEntity;
use crate::metrics::QueryTimer;

/// Repository for personal health logs.
#[derive(Clone)]
pub struct HealthLogRepository {
    pool: PgPool,
}

impl HealthLogRepository {
    /// Creates a new HealthLogRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lists a user's logs, newest first.
    pub async fn list_for_user(
        &self,
        user_id: i64,
        limit: i64,
    ) -> Result<Vec<HealthLogEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_health_logs");
        let result = sqlx::query_as::<_, HealthLogEntity>(
            r#"
            SELECT h.id, h.user_id, h.log_date, h.symptoms, h.severity, h.note,
                   h.aqi_snapshot, h.district_id, d.name AS district_name, h.created_at
            FROM health_logs h
            LEFT JOIN districts d ON d.id = h.district_id
            WHERE h.user_id = $1
            ORDER BY h.log_date DESC, h.created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Creates a log, snapshotting the latest AQI of `district_id`.
    pub async fn create(
        &self,
        user_id: i64,
        log_date: NaiveDate,
        symptoms: &[String],
        severity: i16,
        note: Option<&str>,
        district_id: Option<i64>,
    ) -> Result<HealthLogEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_health_log");
        let result = sqlx::query_as::<_, HealthLogEntity>(
            r#"
            WITH inserted AS (
                INSERT INTO health_logs
                    (user_id, log_date, symptoms, severity, note, aqi_snapshot, district_id)
                VALUES (
                    $1, $2, $3, $4, $5,
                    (SELECT aqi FROM realtime_readings
                     WHERE district_id = $6
                     ORDER BY observed_at DESC
                     LIMIT 1),
                    $6
                )
                RETURNING id, user_id, log_date, symptoms, severity, note, aqi_snapshot,
                          district_id, created_at
            )
            SELECT i.id, i.user_id, i.log_date, i.symptoms, i.severity, i.note,
                   i.aqi_snapshot, i.district_id, d.name AS district_name, i.created_at
            FROM inserted i
            LEFT JOIN districts d ON d.id = i.district_id
            "#,
        )
        .bind(user_id)
        .bind(log_date)
        .bind(symptoms)
        .bind(severity)
        .bind(note)
        .bind(district_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }
}
