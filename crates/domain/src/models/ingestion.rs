//! Batch ingestion models.
//!
//! Uploaded rows arrive either as CSV records or as JSON objects. Both are
//! first flattened into a [`RawRow`] of trimmed string cells keyed by a
//! lowercase column name, then validated into a [`NormalizedRow`].

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::measurement::{ForecastInput, ReadingInput};

/// Which table a batch targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestKind {
    Realtime,
    Forecast,
}

const REALTIME_REQUIRED: &[&str] = &[
    "datetime",
    "district",
    "pm25",
    "pm10",
    "temperature",
    "humidity",
    "aqi",
];

const FORECAST_REQUIRED: &[&str] = &["datetime", "district", "pm25_forecast", "aqi_forecast"];

impl IngestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IngestKind::Realtime => "realtime",
            IngestKind::Forecast => "forecast",
        }
    }

    /// Header columns that must be present for the batch to be accepted.
    pub fn required_columns(&self) -> &'static [&'static str] {
        match self {
            IngestKind::Realtime => REALTIME_REQUIRED,
            IngestKind::Forecast => FORECAST_REQUIRED,
        }
    }

    /// Table the batch is written to.
    pub fn table(&self) -> &'static str {
        match self {
            IngestKind::Realtime => "realtime_readings",
            IngestKind::Forecast => "forecasts",
        }
    }

    /// Column holding the AQI value.
    pub fn aqi_column(&self) -> &'static str {
        match self {
            IngestKind::Realtime => "aqi",
            IngestKind::Forecast => "aqi_forecast",
        }
    }
}

impl FromStr for IngestKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "realtime" | "upload_realtime" => Ok(IngestKind::Realtime),
            "forecast" | "upload_forecast" => Ok(IngestKind::Forecast),
            _ => Err(format!("Invalid data type: {}", s)),
        }
    }
}

impl fmt::Display for IngestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Normalizes a header or JSON key: trimmed, lowercase, BOM stripped.
pub fn normalize_column(name: &str) -> String {
    name.trim_start_matches('\u{feff}').trim().to_lowercase()
}

/// One uploaded row as string cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    cells: HashMap<String, String>,
}

impl RawRow {
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let cells = pairs
            .into_iter()
            .map(|(k, v)| (normalize_column(k.as_ref()), v.as_ref().trim().to_string()))
            .collect();
        Self { cells }
    }

    /// Flattens a JSON object. Numbers and booleans become their text form and
    /// `null` becomes an empty cell.
    pub fn from_json(object: &serde_json::Map<String, serde_json::Value>) -> Self {
        use serde_json::Value;

        let cells = object
            .iter()
            .map(|(k, v)| {
                let text = match v {
                    Value::Null => String::new(),
                    Value::String(s) => s.trim().to_string(),
                    other => other.to_string(),
                };
                (normalize_column(k), text)
            })
            .collect();
        Self { cells }
    }

    /// Returns the cell value, treating blank cells as absent.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .get(column)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }
}

/// A row that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedRow {
    Reading(ReadingInput),
    Forecast(ForecastInput),
}

/// A per-row validation failure. Never aborts the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    /// 1-based data row number (the header is not counted).
    pub row: usize,
    pub message: String,
}

impl RowError {
    pub fn new(row: usize, message: impl Into<String>) -> Self {
        Self {
            row,
            message: message.into(),
        }
    }
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Row {}: {}", self.row, self.message)
    }
}

/// Result of one batch.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct IngestSummary {
    pub inserted: usize,
    pub errors: Vec<String>,
}

impl IngestSummary {
    pub fn new(inserted: usize, errors: &[RowError]) -> Self {
        Self {
            inserted,
            errors: errors.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Batch-level failures. Nothing is written when one of these occurs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IngestError {
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("No data rows found")]
    EmptyBatch,

    #[error("Too many rows: {count} (maximum {max})")]
    TooManyRows { count: usize, max: usize },

    #[error("Malformed input: {0}")]
    Malformed(String),
}

/// Verifies a header contains every required column of `kind`.
pub fn check_header<S: AsRef<str>>(kind: IngestKind, headers: &[S]) -> Result<(), IngestError> {
    let present: Vec<String> = headers.iter().map(|h| normalize_column(h.as_ref())).collect();
    let missing: Vec<String> = kind
        .required_columns()
        .iter()
        .filter(|col| !present.iter().any(|p| p == *col))
        .map(|col| col.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(IngestError::MissingColumns(missing))
    }
}

/// Verifies batch size bounds.
pub fn check_batch_size(count: usize, max: usize) -> Result<(), IngestError> {
    if count == 0 {
        return Err(IngestError::EmptyBatch);
    }
    if count > max {
        return Err(IngestError::TooManyRows { count, max });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_from_str() {
        assert_eq!(IngestKind::from_str("realtime").unwrap(), IngestKind::Realtime);
        assert_eq!(
            IngestKind::from_str("upload_forecast").unwrap(),
            IngestKind::Forecast
        );
        assert!(IngestKind::from_str("hourly").is_err());
    }

    #[test]
    fn test_check_header_ok() {
        let headers = ["datetime", "district", "pm25", "pm10", "temperature", "humidity", "aqi"];
        assert!(check_header(IngestKind::Realtime, &headers).is_ok());
    }

    #[test]
    fn test_check_header_tolerates_case_and_bom() {
        let headers = ["\u{feff}DateTime", " District ", "PM25_FORECAST", "aqi_forecast"];
        assert!(check_header(IngestKind::Forecast, &headers).is_ok());
    }

    #[test]
    fn test_check_header_reports_missing() {
        let headers = ["datetime", "district", "pm25"];
        let err = check_header(IngestKind::Realtime, &headers).unwrap_err();
        assert_eq!(
            err,
            IngestError::MissingColumns(vec![
                "pm10".into(),
                "temperature".into(),
                "humidity".into(),
                "aqi".into()
            ])
        );
        assert_eq!(
            err.to_string(),
            "Missing required columns: pm10, temperature, humidity, aqi"
        );
    }

    #[test]
    fn test_batch_size() {
        assert_eq!(check_batch_size(0, 10), Err(IngestError::EmptyBatch));
        assert!(check_batch_size(10, 10).is_ok());
        assert_eq!(
            check_batch_size(11, 10),
            Err(IngestError::TooManyRows { count: 11, max: 10 })
        );
    }

    #[test]
    fn test_raw_row_from_json() {
        let value = json!({"District": " Ba Đình ", "aqi": 156, "pm10": null, "pm25": "55.2"});
        let row = RawRow::from_json(value.as_object().unwrap());
        assert_eq!(row.get("district"), Some("Ba Đình"));
        assert_eq!(row.get("aqi"), Some("156"));
        assert_eq!(row.get("pm25"), Some("55.2"));
        assert_eq!(row.get("pm10"), None);
        assert_eq!(row.get("humidity"), None);
    }

    #[test]
    fn test_raw_row_blank_cells_absent() {
        let row = RawRow::from_pairs([("pm25", "  "), ("aqi", "10")]);
        assert_eq!(row.get("pm25"), None);
        assert_eq!(row.get("aqi"), Some("10"));
    }

    #[test]
    fn test_row_error_display() {
        let err = RowError::new(3, "District not found: Atlantis");
        assert_eq!(err.to_string(), "Row 3: District not found: Atlantis");

        let summary = IngestSummary::new(4, &[err]);
        assert_eq!(summary.errors, vec!["Row 3: District not found: Atlantis"]);
    }
}
