//! User settings repository.

use sqlx::PgPool;

use crate::entities::UserSettingsEntity;
use crate::metrics::QueryTimer;

const SETTINGS_SELECT: &str = r#"
    SELECT s.user_id, s.alert_threshold, s.email_alerts, s.sms_alerts, s.locale,
           s.temperature_unit, s.district_id, d.name AS district_name, s.phone, s.updated_at
    FROM user_settings s
    LEFT JOIN districts d ON d.id = s.district_id
    WHERE s.user_id = $1
"#;

/// Settings changes; `None` keeps the stored value.
///
/// `district_id` and `phone` use a nested option so `Some(None)` clears them.
#[derive(Debug, Clone, Default)]
pub struct SettingsChanges<'a> {
    pub alert_threshold: Option<i32>,
    pub email_alerts: Option<bool>,
    pub sms_alerts: Option<bool>,
    pub locale: Option<&'a str>,
    pub temperature_unit: Option<&'a str>,
    pub district_id: Option<Option<i64>>,
    pub phone: Option<Option<&'a str>>,
}

/// Repository for per-user settings.
#[derive(Clone)]
pub struct UserSettingsRepository {
    pool: PgPool,
}

impl UserSettingsRepository {
    /// Creates a new UserSettingsRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns the user's settings, creating the default row on first access.
    pub async fn get_or_create(&self, user_id: i64) -> Result<UserSettingsEntity, sqlx::Error> {
        let timer = QueryTimer::new("get_or_create_user_settings");
        sqlx::query("INSERT INTO user_settings (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        let result = sqlx::query_as::<_, UserSettingsEntity>(SETTINGS_SELECT)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Applies a partial update, creating defaults first if needed.
    pub async fn update(
        &self,
        user_id: i64,
        changes: &SettingsChanges<'_>,
    ) -> Result<UserSettingsEntity, sqlx::Error> {
        let timer = QueryTimer::new("update_user_settings");
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO user_settings (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            UPDATE user_settings
            SET alert_threshold = COALESCE($2, alert_threshold),
                email_alerts = COALESCE($3, email_alerts),
                sms_alerts = COALESCE($4, sms_alerts),
                locale = COALESCE($5, locale),
                temperature_unit = COALESCE($6, temperature_unit),
                district_id = CASE WHEN $7 THEN $8 ELSE district_id END,
                phone = CASE WHEN $9 THEN $10 ELSE phone END,
                updated_at = NOW()
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(changes.alert_threshold)
        .bind(changes.email_alerts)
        .bind(changes.sms_alerts)
        .bind(changes.locale)
        .bind(changes.temperature_unit)
        .bind(changes.district_id.is_some())
        .bind(changes.district_id.flatten())
        .bind(changes.phone.is_some())
        .bind(changes.phone.flatten())
        .execute(&mut *tx)
        .await?;

        let settings = sqlx::query_as::<_, UserSettingsEntity>(SETTINGS_SELECT)
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        timer.record();
        Ok(settings)
    }
}
