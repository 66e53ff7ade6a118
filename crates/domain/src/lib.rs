//! Domain layer for the air-quality platform backend.
//!
//! This crate contains:
//! - Domain models (districts, AQI scale, readings, reports, users, ...)
//! - The ingestion validator that normalizes uploaded rows
//! - Report lifecycle and alert evaluation rules
//! - The notifier trait implemented by outbound channels

pub mod models;
pub mod services;
