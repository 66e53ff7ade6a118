//! AQI scale buckets and classification.
//!
//! The scale is a list of labeled inclusive ranges that must partition
//! `0..=MAX_AQI` with no gaps or overlaps. Every stored reading and forecast
//! references the bucket its AQI value falls into.

use serde::{Deserialize, Serialize};
use shared::validation::MAX_AQI;
use thiserror::Error;

/// One labeled severity tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AqiScaleBucket {
    pub id: i64,
    pub min_aqi: i32,
    pub max_aqi: i32,
    pub level: String,
    pub color: String,
}

impl AqiScaleBucket {
    pub fn contains(&self, aqi: i32) -> bool {
        (self.min_aqi..=self.max_aqi).contains(&aqi)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScaleError {
    #[error("AQI scale has no buckets")]
    Empty,

    #[error("AQI scale must start at 0, starts at {0}")]
    BadStart(i32),

    #[error("AQI scale must end at {MAX_AQI}, ends at {0}")]
    BadEnd(i32),

    #[error("Bucket '{0}' has min greater than max")]
    Inverted(String),

    #[error("Gap between {after} and {next_min}")]
    Gap { after: i32, next_min: i32 },

    #[error("Buckets overlap at {0}")]
    Overlap(i32),
}

/// An ordered AQI scale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AqiScale {
    buckets: Vec<AqiScaleBucket>,
}

impl AqiScale {
    pub fn new(mut buckets: Vec<AqiScaleBucket>) -> Self {
        buckets.sort_by_key(|b| b.min_aqi);
        Self { buckets }
    }

    /// The US EPA scale, matching the rows seeded by the initial migration.
    pub fn standard() -> Self {
        let tiers = [
            (0, 50, "Good", "#00e400"),
            (51, 100, "Moderate", "#ffff00"),
            (101, 150, "Unhealthy for Sensitive Groups", "#ff7e00"),
            (151, 200, "Unhealthy", "#ff0000"),
            (201, 300, "Very Unhealthy", "#8f3f97"),
            (301, 500, "Hazardous", "#7e0023"),
        ];
        Self::new(
            tiers
                .iter()
                .enumerate()
                .map(|(i, (min, max, level, color))| AqiScaleBucket {
                    id: i as i64 + 1,
                    min_aqi: *min,
                    max_aqi: *max,
                    level: level.to_string(),
                    color: color.to_string(),
                })
                .collect(),
        )
    }

    pub fn buckets(&self) -> &[AqiScaleBucket] {
        &self.buckets
    }

    /// Finds the bucket containing `aqi`.
    pub fn classify(&self, aqi: i32) -> Option<&AqiScaleBucket> {
        self.buckets.iter().find(|b| b.contains(aqi))
    }

    /// Checks that the buckets partition `0..=MAX_AQI`.
    pub fn check_partition(&self) -> Result<(), ScaleError> {
        let first = self.buckets.first().ok_or(ScaleError::Empty)?;
        if first.min_aqi != 0 {
            return Err(ScaleError::BadStart(first.min_aqi));
        }

        for bucket in &self.buckets {
            if bucket.min_aqi > bucket.max_aqi {
                return Err(ScaleError::Inverted(bucket.level.clone()));
            }
        }

        for pair in self.buckets.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            if next.min_aqi <= prev.max_aqi {
                return Err(ScaleError::Overlap(next.min_aqi));
            }
            if next.min_aqi != prev.max_aqi + 1 {
                return Err(ScaleError::Gap {
                    after: prev.max_aqi,
                    next_min: next.min_aqi,
                });
            }
        }

        let last = self.buckets.last().ok_or(ScaleError::Empty)?;
        if last.max_aqi != MAX_AQI {
            return Err(ScaleError::BadEnd(last.max_aqi));
        }
        Ok(())
    }
}

/// Parses a raw AQI cell, rounding to the nearest integer.
///
/// Returns `None` for non-numeric, non-finite or negative input.
pub fn parse_aqi(raw: &str) -> Option<i32> {
    let value: f64 = raw.trim().parse().ok()?;
    if !value.is_finite() || value < 0.0 || value > i32::MAX as f64 {
        return None;
    }
    Some(value.round() as i32)
}
