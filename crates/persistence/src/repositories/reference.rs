//! Reference data repository (districts, AQI scale, pollution types).

use sqlx::PgPool;

use crate::entities::{AqiScaleEntity, DistrictEntity, PollutionTypeEntity};
use crate::metrics::QueryTimer;

/// Repository for seeded lookup tables.
#[derive(Clone)]
pub struct ReferenceRepository {
    pool: PgPool,
}

impl ReferenceRepository {
    /// Creates a new ReferenceRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List all districts ordered by name.
    pub async fn list_districts(&self) -> Result<Vec<DistrictEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_districts");
        let result = sqlx::query_as::<_, DistrictEntity>(
            r#"
            SELECT id, name, latitude, longitude
            FROM districts
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a district by id.
    pub async fn find_district(&self, id: i64) -> Result<Option<DistrictEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_district_by_id");
        let result = sqlx::query_as::<_, DistrictEntity>(
            r#"
            SELECT id, name, latitude, longitude
            FROM districts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a district by name, ignoring case and surrounding whitespace.
    pub async fn find_district_by_name(
        &self,
        name: &str,
    ) -> Result<Option<DistrictEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_district_by_name");
        let result = sqlx::query_as::<_, DistrictEntity>(
            r#"
            SELECT id, name, latitude, longitude
            FROM districts
            WHERE LOWER(name) = LOWER(TRIM($1))
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Load the AQI scale ordered by lower bound.
    pub async fn aqi_scale(&self) -> Result<Vec<AqiScaleEntity>, sqlx::Error> {
        let timer = QueryTimer::new("load_aqi_scale");
        let result = sqlx::query_as::<_, AqiScaleEntity>(
            r#"
            SELECT id, min_aqi, max_aqi, level, color
            FROM aqi_scale
            ORDER BY min_aqi
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List pollution types.
    pub async fn list_pollution_types(&self) -> Result<Vec<PollutionTypeEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_pollution_types");
        let result = sqlx::query_as::<_, PollutionTypeEntity>(
            r#"
            SELECT id, code, name
            FROM pollution_types
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a pollution type by its code.
    pub async fn find_pollution_type(
        &self,
        code: &str,
    ) -> Result<Option<PollutionTypeEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_pollution_type_by_code");
        let result = sqlx::query_as::<_, PollutionTypeEntity>(
            r#"
            SELECT id, code, name
            FROM pollution_types
            WHERE code = LOWER(TRIM($1))
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }
}
