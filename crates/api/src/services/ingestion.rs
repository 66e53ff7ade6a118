//! Batch ingestion of readings and forecasts.
//!
//! Accepts CSV uploads and JSON row arrays. Both are flattened into
//! [`RawRow`]s, validated against the district directory and AQI scale, and
//! written in one transaction. Batch-level problems (bad header, empty or
//! oversized batch) reject the whole upload; row problems are reported and
//! the remaining rows are still written.

use chrono::Utc;
use domain::models::{
    ingestion::{check_batch_size, check_header},
    AqiScale, AqiScaleBucket, District, DistrictDirectory, IngestError, IngestKind,
    IngestSummary, RawRow, SourceTag,
};
use domain::services::{IngestionOptions, IngestionValidator};
use persistence::repositories::{MeasurementRepository, ReferenceRepository};
use sqlx::PgPool;
use std::collections::BTreeSet;
use thiserror::Error;

use crate::config::LimitsConfig;
use crate::error::ApiError;
use crate::middleware::metrics::record_ingest;

#[derive(Debug, Error)]
pub enum IngestionError {
    #[error(transparent)]
    Batch(#[from] IngestError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<IngestionError> for ApiError {
    fn from(err: IngestionError) -> Self {
        match err {
            IngestionError::Batch(e) => ApiError::Validation(e.to_string()),
            IngestionError::Database(e) => ApiError::from(e),
        }
    }
}

/// Parses CSV bytes into a header and rows. Blank lines are skipped and
/// short records leave their trailing columns empty.
pub fn parse_csv(bytes: &[u8]) -> Result<(Vec<String>, Vec<RawRow>), IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| IngestError::Malformed(e.to_string()))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| IngestError::Malformed(e.to_string()))?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        rows.push(RawRow::from_pairs(headers.iter().zip(record.iter())));
    }
    Ok((headers, rows))
}

/// Flattens JSON objects into rows. The header is the union of keys.
pub fn parse_json_rows(
    data: &[serde_json::Value],
) -> Result<(Vec<String>, Vec<RawRow>), IngestError> {
    let mut headers = BTreeSet::new();
    let mut rows = Vec::with_capacity(data.len());
    for (i, value) in data.iter().enumerate() {
        let object = value.as_object().ok_or_else(|| {
            IngestError::Malformed(format!("Row {} is not a JSON object", i + 1))
        })?;
        headers.extend(object.keys().cloned());
        rows.push(RawRow::from_json(object));
    }
    Ok((headers.into_iter().collect(), rows))
}

#[derive(Clone)]
pub struct IngestionService {
    measurements: MeasurementRepository,
    reference: ReferenceRepository,
    limits: LimitsConfig,
}

impl IngestionService {
    pub fn new(pool: PgPool, limits: LimitsConfig) -> Self {
        Self {
            measurements: MeasurementRepository::new(pool.clone()),
            reference: ReferenceRepository::new(pool),
            limits,
        }
    }

    /// Ingests an uploaded CSV file. Replaces earlier CSV-sourced rows.
    pub async fn ingest_csv(
        &self,
        kind: IngestKind,
        bytes: &[u8],
    ) -> Result<IngestSummary, IngestionError> {
        let (headers, rows) = parse_csv(bytes)?;
        check_header(kind, &headers)?;
        check_batch_size(rows.len(), self.limits.max_upload_rows)?;
        self.ingest(kind, &rows, SourceTag::Csv).await
    }

    /// Ingests rows posted as JSON.
    pub async fn ingest_json(
        &self,
        kind: IngestKind,
        data: &[serde_json::Value],
    ) -> Result<IngestSummary, IngestionError> {
        check_batch_size(data.len(), self.limits.max_upload_rows)?;
        let (headers, rows) = parse_json_rows(data)?;
        check_header(kind, &headers)?;
        self.ingest(kind, &rows, SourceTag::Manual).await
    }

    async fn ingest(
        &self,
        kind: IngestKind,
        rows: &[RawRow],
        source: SourceTag,
    ) -> Result<IngestSummary, IngestionError> {
        let districts: Vec<District> = self
            .reference
            .list_districts()
            .await?
            .into_iter()
            .map(Into::into)
            .collect();
        let directory = DistrictDirectory::new(&districts);
        let scale = self.load_scale().await?;

        let options = IngestionOptions::new(
            self.limits.ingest_utc_offset_hours,
            self.limits.forecast_horizon_days,
            Utc::now(),
        );
        let validator = IngestionValidator::new(kind, &directory, &scale, options);
        let (accepted, errors) = validator.normalize_all(rows);

        // A CSV upload replaces the previous CSV rows even when none of its
        // own rows validate.
        let inserted = if accepted.is_empty() && source != SourceTag::Csv {
            0
        } else {
            self.measurements
                .upsert_batch(kind, &accepted, source)
                .await?
                .upserted
        };

        record_ingest(kind, source.as_str(), inserted, errors.len());
        tracing::info!(
            kind = %kind,
            source = %source,
            rows = rows.len(),
            inserted,
            row_errors = errors.len(),
            "Ingestion batch processed"
        );
        Ok(IngestSummary::new(inserted, &errors))
    }

    async fn load_scale(&self) -> Result<AqiScale, sqlx::Error> {
        let buckets: Vec<AqiScaleBucket> = self
            .reference
            .aqi_scale()
            .await?
            .into_iter()
            .map(Into::into)
            .collect();
        Ok(scale_or_standard(AqiScale::new(buckets)))
    }
}

/// Returns `scale` if it partitions `0..=500`, else the standard EPA scale.
fn scale_or_standard(scale: AqiScale) -> AqiScale {
    match scale.check_partition() {
        Ok(()) => scale,
        Err(e) => {
            tracing::warn!(error = %e, "Stored AQI scale is invalid; using the standard EPA scale");
            AqiScale::standard()
        }
    }
}
