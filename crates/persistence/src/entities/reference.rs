//! Reference data entities (districts, AQI scale, pollution types).

use sqlx::FromRow;

/// Database row mapping for the districts table.
#[derive(Debug, Clone, FromRow)]
pub struct DistrictEntity {
    pub id: i64,
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl From<DistrictEntity> for domain::models::District {
    fn from(entity: DistrictEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            latitude: entity.latitude,
            longitude: entity.longitude,
        }
    }
}

/// Database row mapping for the aqi_scale table.
#[derive(Debug, Clone, FromRow)]
pub struct AqiScaleEntity {
    pub id: i64,
    pub min_aqi: i32,
    pub max_aqi: i32,
    pub level: String,
    pub color: String,
}

impl From<AqiScaleEntity> for domain::models::AqiScaleBucket {
    fn from(entity: AqiScaleEntity) -> Self {
        Self {
            id: entity.id,
            min_aqi: entity.min_aqi,
            max_aqi: entity.max_aqi,
            level: entity.level,
            color: entity.color,
        }
    }
}

/// Database row mapping for the pollution_types table.
#[derive(Debug, Clone, FromRow)]
pub struct PollutionTypeEntity {
    pub id: i64,
    pub code: String,
    pub name: String,
}

impl From<PollutionTypeEntity> for domain::models::PollutionType {
    fn from(entity: PollutionTypeEntity) -> Self {
        Self {
            id: entity.id,
            code: entity.code,
            name: entity.name,
        }
    }
}
