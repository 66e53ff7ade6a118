//! Realtime readings and forecasts.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default forecast horizon in days.
pub const DEFAULT_FORECAST_DAYS: i64 = 7;

/// Forecast rows returned per requested day.
pub const FORECAST_ROWS_PER_DAY: i64 = 30;

/// Upper bound on the requested forecast horizon.
pub const MAX_FORECAST_DAYS: i64 = 365;

/// Where a reading or forecast came from.
///
/// CSV uploads replace every row tagged `Csv` of the same kind; manual rows
/// are never removed by that path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceTag {
    Manual,
    Csv,
}

impl SourceTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceTag::Manual => "manual",
            SourceTag::Csv => "csv",
        }
    }
}

impl FromStr for SourceTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "manual" => Ok(SourceTag::Manual),
            "csv" => Ok(SourceTag::Csv),
            _ => Err(format!("Invalid source tag: {}", s)),
        }
    }
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A validated realtime reading ready for upsert.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingInput {
    pub district_id: i64,
    pub observed_at: DateTime<Utc>,
    pub pm25: Option<f64>,
    pub pm10: Option<f64>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub aqi: i32,
    pub aqi_scale_id: i64,
}

/// A validated forecast ready for upsert.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastInput {
    pub district_id: i64,
    pub forecast_at: DateTime<Utc>,
    pub pm25_forecast: Option<f64>,
    pub pm10_forecast: Option<f64>,
    pub aqi_forecast: i32,
    pub temperature_forecast: Option<f64>,
    pub humidity_forecast: Option<f64>,
    pub aqi_scale_id: i64,
}

/// Most recent reading of one district.
///
/// Measurement fields are null for districts that have no readings yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatestReading {
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

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastEntry {
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

/// Resolved parameters of a forecast read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastQuery {
    pub district_id: Option<i64>,
    pub days: i64,
}

impl ForecastQuery {
    /// Builds a query from raw request values. Missing days default to 7 and
    /// the rest is clamped to `1..=MAX_FORECAST_DAYS`.
    pub fn new(district_id: Option<i64>, days: Option<i64>) -> Self {
        Self {
            district_id,
            days: days
                .unwrap_or(DEFAULT_FORECAST_DAYS)
                .clamp(1, MAX_FORECAST_DAYS),
        }
    }

    /// Maximum number of rows to return.
    pub fn row_cap(&self) -> i64 {
        self.days.saturating_mul(FORECAST_ROWS_PER_DAY)
    }

    /// Inclusive time window `[now - 1 day, now + days]`.
    pub fn window(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        (now - Duration::days(1), now + Duration::days(self.days))
    }
}
