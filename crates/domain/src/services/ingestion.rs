//! Row validation for bulk ingestion.
//!
//! Maps raw string cells onto district ids, AQI bucket ids and typed
//! measurements. Pure: the caller supplies the district directory, the AQI
//! scale and the clock.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};

use crate::models::aqi::{parse_aqi, AqiScale};
use crate::models::district::DistrictDirectory;
use crate::models::ingestion::{IngestKind, NormalizedRow, RawRow, RowError};
use crate::models::measurement::{ForecastInput, ReadingInput};

/// Naive datetime layouts accepted in uploads, tried in order.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// Clock and locale inputs to validation.
#[derive(Debug, Clone, Copy)]
pub struct IngestionOptions {
    /// Offset applied to datetimes without an explicit zone.
    pub utc_offset: FixedOffset,
    /// Forecasts are accepted up to this many days ahead.
    pub forecast_horizon_days: i64,
    pub now: DateTime<Utc>,
}

impl IngestionOptions {
    /// Builds options from an hour offset; out-of-range offsets fall back to UTC.
    pub fn new(utc_offset_hours: i32, forecast_horizon_days: i64, now: DateTime<Utc>) -> Self {
        let utc_offset = FixedOffset::east_opt(utc_offset_hours.saturating_mul(3600))
            .unwrap_or_else(|| Utc.fix());
        Self {
            utc_offset,
            forecast_horizon_days: forecast_horizon_days.max(1),
            now,
        }
    }
}

/// Validates rows of one batch.
pub struct IngestionValidator<'a> {
    kind: IngestKind,
    districts: &'a DistrictDirectory,
    scale: &'a AqiScale,
    options: IngestionOptions,
}

impl<'a> IngestionValidator<'a> {
    pub fn new(
        kind: IngestKind,
        districts: &'a DistrictDirectory,
        scale: &'a AqiScale,
        options: IngestionOptions,
    ) -> Self {
        Self {
            kind,
            districts,
            scale,
            options,
        }
    }

    /// Validates every row, splitting them into accepted rows and row errors.
    ///
    /// Row numbers are 1-based and count data rows only.
    pub fn normalize_all(&self, rows: &[RawRow]) -> (Vec<NormalizedRow>, Vec<RowError>) {
        let mut accepted = Vec::with_capacity(rows.len());
        let mut errors = Vec::new();
        for (i, row) in rows.iter().enumerate() {
            match self.normalize(row) {
                Ok(normalized) => accepted.push(normalized),
                Err(message) => errors.push(RowError::new(i + 1, message)),
            }
        }
        (accepted, errors)
    }

    /// Validates a single row, returning the failure message on error.
    pub fn normalize(&self, row: &RawRow) -> Result<NormalizedRow, String> {
        let raw_datetime = required(row, "datetime")?;
        let at = parse_datetime(raw_datetime, self.options.utc_offset)
            .ok_or_else(|| format!("Invalid datetime: {}", raw_datetime))?;

        let district_name = required(row, "district")?;
        let district_id = self
            .districts
            .resolve(district_name)
            .ok_or_else(|| format!("District not found: {}", district_name))?;

        let aqi_column = self.kind.aqi_column();
        let raw_aqi = required(row, aqi_column)?;
        let (aqi, aqi_scale_id) = parse_aqi(raw_aqi)
            .and_then(|aqi| self.scale.classify(aqi).map(|b| (aqi, b.id)))
            .ok_or_else(|| format!("Invalid AQI level/value: {}", raw_aqi))?;

        match self.kind {
            IngestKind::Realtime => Ok(NormalizedRow::Reading(ReadingInput {
                district_id,
                observed_at: at,
                pm25: number(row, "pm25")?,
                pm10: number(row, "pm10")?,
                temperature: number(row, "temperature")?,
                humidity: number(row, "humidity")?,
                aqi,
                aqi_scale_id,
            })),
            IngestKind::Forecast => {
                self.check_forecast_window(at, raw_datetime)?;
                Ok(NormalizedRow::Forecast(ForecastInput {
                    district_id,
                    forecast_at: at,
                    pm25_forecast: number(row, "pm25_forecast")?,
                    pm10_forecast: number(row, "pm10_forecast")?,
                    aqi_forecast: aqi,
                    temperature_forecast: number(row, "temperature_forecast")?,
                    humidity_forecast: number(row, "humidity_forecast")?,
                    aqi_scale_id,
                }))
            }
        }
    }

    fn check_forecast_window(&self, at: DateTime<Utc>, raw: &str) -> Result<(), String> {
        let earliest = self.options.now - Duration::days(1);
        let latest = self.options.now + Duration::days(self.options.forecast_horizon_days);
        if at < earliest || at > latest {
            return Err(format!("Forecast outside validity window: {}", raw));
        }
        Ok(())
    }
}

fn required<'r>(row: &'r RawRow, column: &str) -> Result<&'r str, String> {
    row.get(column)
        .ok_or_else(|| format!("Missing value for {}", column))
}

/// Parses an optional numeric cell. Blank cells are `None`.
fn number(row: &RawRow, column: &str) -> Result<Option<f64>, String> {
    match row.get(column) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Some)
            .ok_or_else(|| format!("Invalid number for {}: {}", column, raw)),
    }
}

/// Parses an upload datetime.
///
/// RFC 3339 values carry their own offset; naive values are read in
/// `offset`. A bare date means midnight.
pub fn parse_datetime(raw: &str, offset: FixedOffset) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    let naive = NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;

    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}
