//! Alert candidate query.

use sqlx::PgPool;

use crate::entities::AlertCandidateEntity;
use crate::metrics::QueryTimer;

/// Repository backing the alert evaluator.
#[derive(Clone)]
pub struct AlertRepository {
    pool: PgPool,
}

impl AlertRepository {
    /// Creates a new AlertRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Active users with email alerts on and a chosen district, each joined
    /// with the latest reading of that district (null when none).
    pub async fn candidates(&self) -> Result<Vec<AlertCandidateEntity>, sqlx::Error> {
        let timer = QueryTimer::new("alert_candidates");
        let result = sqlx::query_as::<_, AlertCandidateEntity>(
            r#"
            SELECT u.id AS user_id, u.username, u.email, s.alert_threshold AS threshold,
                   d.name AS district_name, r.aqi, r.pm25, r.temperature
            FROM users u
            JOIN user_settings s ON s.user_id = u.id
            JOIN districts d ON d.id = s.district_id
            LEFT JOIN LATERAL (
                SELECT rr.aqi, rr.pm25, rr.temperature
                FROM realtime_readings rr
                WHERE rr.district_id = s.district_id
                ORDER BY rr.observed_at DESC
                LIMIT 1
            ) r ON true
            WHERE u.is_active AND s.email_alerts
            ORDER BY u.id
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
