//! System settings repository (singleton row `id = 1`).

use sqlx::PgPool;

use crate::entities::SystemSettingsEntity;
use crate::metrics::QueryTimer;

/// Repository for global platform settings.
#[derive(Clone)]
pub struct SystemSettingsRepository {
    pool: PgPool,
}

impl SystemSettingsRepository {
    /// Creates a new SystemSettingsRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Reads the singleton, creating it with defaults if the seed is missing.
    pub async fn get(&self) -> Result<SystemSettingsEntity, sqlx::Error> {
        let timer = QueryTimer::new("get_system_settings");
        let result = sqlx::query_as::<_, SystemSettingsEntity>(
            r#"
            INSERT INTO system_settings (id) VALUES (1)
            ON CONFLICT (id) DO UPDATE SET id = system_settings.id
            RETURNING maintenance_mode, refresh_interval, updated_at, updated_by
            "#,
        )
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Whether maintenance mode is on.
    pub async fn maintenance_mode(&self) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("get_maintenance_mode");
        let result = sqlx::query_scalar::<_, bool>(
            "SELECT maintenance_mode FROM system_settings WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(result?.unwrap_or(false))
    }

    /// Updates the given fields, stamping author and time.
    pub async fn update(
        &self,
        maintenance_mode: Option<bool>,
        refresh_interval: Option<&str>,
        updated_by: i64,
    ) -> Result<SystemSettingsEntity, sqlx::Error> {
        let timer = QueryTimer::new("update_system_settings");
        let result = sqlx::query_as::<_, SystemSettingsEntity>(
            r#"
            INSERT INTO system_settings (id, maintenance_mode, refresh_interval, updated_by)
            VALUES (1, COALESCE($1, false), COALESCE($2, '5m'), $3)
            ON CONFLICT (id) DO UPDATE SET
                maintenance_mode = COALESCE($1, system_settings.maintenance_mode),
                refresh_interval = COALESCE($2, system_settings.refresh_interval),
                updated_by = $3,
                updated_at = NOW()
            RETURNING maintenance_mode, refresh_interval, updated_at, updated_by
            "#,
        )
        .bind(maintenance_mode)
        .bind(refresh_interval)
        .bind(updated_by)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }
}
