//! Reading and forecast repository.
//!
//! Writes go through [`MeasurementRepository::upsert_batch`]: one transaction
//! per batch, one `INSERT ... ON CONFLICT (district, timestamp) DO UPDATE` per
//! row. A store error on any row rolls back the whole batch.

use chrono::{DateTime, Utc};
use domain::models::{ForecastInput, IngestKind, NormalizedRow, ReadingInput, SourceTag};
use sqlx::{PgPool, Postgres, Transaction};

use crate::entities::{ForecastEntity, LatestReadingEntity};
use crate::metrics::{record_rows_written, QueryTimer};

/// Repository for realtime readings and forecasts.
#[derive(Clone)]
pub struct MeasurementRepository {
    pool: PgPool,
}

/// Outcome of a committed batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpsertResult {
    pub upserted: usize,
    pub replaced: u64,
}

impl MeasurementRepository {
    /// Creates a new MeasurementRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Upserts a validated batch inside one transaction.
    ///
    /// When `source` is [`SourceTag::Csv`], every existing CSV-sourced row of
    /// the same kind is deleted first so the upload replaces the previous one.
    pub async fn upsert_batch(
        &self,
        kind: IngestKind,
        rows: &[NormalizedRow],
        source: SourceTag,
    ) -> Result<UpsertResult, sqlx::Error> {
        let timer = QueryTimer::new("upsert_measurement_batch");
        let mut tx = self.pool.begin().await?;

        let replaced = if source == SourceTag::Csv {
            Self::delete_csv_rows(&mut tx, kind).await?
        } else {
            0
        };

        let mut upserted = 0;
        for row in rows {
            match row {
                NormalizedRow::Reading(reading) => {
                    Self::upsert_reading(&mut tx, reading, source).await?;
                }
                NormalizedRow::Forecast(forecast) => {
                    Self::upsert_forecast(&mut tx, forecast, source).await?;
                }
            }
            upserted += 1;
        }

        tx.commit().await?;
        timer.record();
        record_rows_written(kind.table(), upserted as u64);

        tracing::debug!(
            kind = %kind,
            source = %source,
            upserted,
            replaced,
            "Measurement batch committed"
        );
        Ok(UpsertResult { upserted, replaced })
    }

    async fn delete_csv_rows(
        tx: &mut Transaction<'_, Postgres>,
        kind: IngestKind,
    ) -> Result<u64, sqlx::Error> {
        let sql = format!("DELETE FROM {} WHERE source = 'csv'", kind.table());
        let result = sqlx::query(&sql).execute(&mut **tx).await?;
        Ok(result.rows_affected())
    }

    async fn upsert_reading(
        tx: &mut Transaction<'_, Postgres>,
        r: &ReadingInput,
        source: SourceTag,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO realtime_readings
                (district_id, observed_at, pm25, pm10, temperature, humidity, aqi, aqi_scale_id, source)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (district_id, observed_at) DO UPDATE SET
                pm25 = EXCLUDED.pm25,
                pm10 = EXCLUDED.pm10,
                temperature = EXCLUDED.temperature,
                humidity = EXCLUDED.humidity,
                aqi = EXCLUDED.aqi,
                aqi_scale_id = EXCLUDED.aqi_scale_id,
                source = EXCLUDED.source,
                updated_at = NOW()
            "#,
        )
        .bind(r.district_id)
        .bind(r.observed_at)
        .bind(r.pm25)
        .bind(r.pm10)
        .bind(r.temperature)
        .bind(r.humidity)
        .bind(r.aqi)
        .bind(r.aqi_scale_id)
        .bind(source.as_str())
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    async fn upsert_forecast(
        tx: &mut Transaction<'_, Postgres>,
        f: &ForecastInput,
        source: SourceTag,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO forecasts
                (district_id, forecast_at, pm25_forecast, pm10_forecast, aqi_forecast,
                 temperature_forecast, humidity_forecast, aqi_scale_id, source)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (district_id, forecast_at) DO UPDATE SET
                pm25_forecast = EXCLUDED.pm25_forecast,
                pm10_forecast = EXCLUDED.pm10_forecast,
                aqi_forecast = EXCLUDED.aqi_forecast,
                temperature_forecast = EXCLUDED.temperature_forecast,
                humidity_forecast = EXCLUDED.humidity_forecast,
                aqi_scale_id = EXCLUDED.aqi_scale_id,
                source = EXCLUDED.source,
                updated_at = NOW()
            "#,
        )
        .bind(f.district_id)
        .bind(f.forecast_at)
        .bind(f.pm25_forecast)
        .bind(f.pm10_forecast)
        .bind(f.aqi_forecast)
        .bind(f.temperature_forecast)
        .bind(f.humidity_forecast)
        .bind(f.aqi_scale_id)
        .bind(source.as_str())
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Latest reading per district, including districts with no readings.
    pub async fn latest_readings(
        &self,
        district_id: Option<i64>,
    ) -> Result<Vec<LatestReadingEntity>, sqlx::Error> {
        let timer = QueryTimer::new("latest_readings");
        let result = sqlx::query_as::<_, LatestReadingEntity>(
            r#"
            SELECT d.id AS district_id, d.name AS district_name, d.latitude, d.longitude,
                   r.observed_at, r.pm25, r.pm10, r.temperature, r.humidity, r.aqi,
                   s.level, s.color, r.source
            FROM districts d
            LEFT JOIN LATERAL (
                SELECT rr.observed_at, rr.pm25, rr.pm10, rr.temperature, rr.humidity,
                       rr.aqi, rr.source
                FROM realtime_readings rr
                WHERE rr.district_id = d.id
                ORDER BY rr.observed_at DESC
                LIMIT 1
            ) r ON true
            LEFT JOIN aqi_scale s ON r.aqi BETWEEN s.min_aqi AND s.max_aqi
            WHERE ($1::BIGINT IS NULL OR d.id = $1)
            ORDER BY d.name
            "#,
        )
        .bind(district_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Latest AQI recorded for a district, if any.
    pub async fn latest_aqi(&self, district_id: i64) -> Result<Option<i32>, sqlx::Error> {
        let timer = QueryTimer::new("latest_aqi_for_district");
        let result = sqlx::query_scalar::<_, i32>(
            r#"
            SELECT aqi
            FROM realtime_readings
            WHERE district_id = $1
            ORDER BY observed_at DESC
            LIMIT 1
            "#,
        )
        .bind(district_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Forecasts with timestamp in `[from, to]`, ascending, capped at `limit`.
    pub async fn forecasts(
        &self,
        district_id: Option<i64>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<ForecastEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_forecasts");
        let result = sqlx::query_as::<_, ForecastEntity>(
            r#"
            SELECT f.district_id, d.name AS district_name, f.forecast_at,
                   f.pm25_forecast, f.pm10_forecast, f.aqi_forecast,
                   f.temperature_forecast, f.humidity_forecast,
                   s.level, s.color
            FROM forecasts f
            JOIN districts d ON d.id = f.district_id
            LEFT JOIN aqi_scale s ON s.id = f.aqi_scale_id
            WHERE f.forecast_at BETWEEN $1 AND $2
              AND ($3::BIGINT IS NULL OR f.district_id = $3)
            ORDER BY f.forecast_at ASC, d.name ASC
            LIMIT $4
            "#,
        )
        .bind(from)
        .bind(to)
        .bind(district_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
