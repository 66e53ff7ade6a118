//! Reading and forecast entities.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Row of the latest-reading aggregation (one per district).
#[derive(Debug, Clone, FromRow)]
pub struct LatestReadingEntity {
    pub district_id: i64,
    pub district_name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub observed_at: Option<DateTime<Utc>>,
    pub pm25: Option<f64>,
    pub pm10: Option<f64>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub aqi: Option<i32>,
    pub level: Option<String>,
    pub color: Option<String>,
    pub source: Option<String>,
}

impl From<LatestReadingEntity> for domain::models::LatestReading {
    fn from(entity: LatestReadingEntity) -> Self {
        Self {
            district_id: entity.district_id,
            district_name: entity.district_name,
            latitude: entity.latitude,
            longitude: entity.longitude,
            observed_at: entity.observed_at,
            pm25: entity.pm25,
            pm10: entity.pm10,
            temperature: entity.temperature,
            humidity: entity.humidity,
            aqi: entity.aqi,
            level: entity.level,
            color: entity.color,
            source: entity.source,
        }
    }
}

/// Forecast row joined with district name and bucket label.
#[derive(Debug, Clone, FromRow)]
pub struct ForecastEntity {
    pub district_id: i64,
    pub district_name: String,
    pub forecast_at: DateTime<Utc>,
    pub pm25_forecast: Option<f64>,
    pub pm10_forecast: Option<f64>,
    pub aqi_forecast: i32,
    pub temperature_forecast: Option<f64>,
    pub humidity_forecast: Option<f64>,
    pub level: Option<String>,
    pub color: Option<String>,
}

impl From<ForecastEntity> for domain::models::ForecastEntry {
    fn from(entity: ForecastEntity) -> Self {
        Self {
            district_id: entity.district_id,
            district_name: entity.district_name,
            forecast_at: entity.forecast_at,
            pm25_forecast: entity.pm25_forecast,
            pm10_forecast: entity.pm10_forecast,
            aqi_forecast: entity.aqi_forecast,
            temperature_forecast: entity.temperature_forecast,
            humidity_forecast: entity.humidity_forecast,
            level: entity.level,
            color: entity.color,
        }
    }
}
