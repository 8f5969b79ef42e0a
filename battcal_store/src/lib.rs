//! Durable and in-memory stores for battery calibration samples.
//!
//! Both stores keep records in insertion order and implement
//! `battcal_traits::SampleSource`, so either can back the calibration engine.
pub mod csv_store;
pub mod error;
pub mod memory;

pub use csv_store::CsvSampleStore;
pub use error::StoreError;
pub use memory::MemorySampleStore;

use battcal_traits::CalibrationSample;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted calibration sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationRecord {
    pub id: u64,
    pub voltage: f64,
    pub percentage: i32,
    pub recorded_at: DateTime<Utc>,
}

impl CalibrationRecord {
    #[inline]
    pub fn sample(&self) -> CalibrationSample {
        CalibrationSample::new(self.voltage, self.percentage)
    }
}

pub(crate) fn check_voltage(voltage: f64) -> error::Result<()> {
    if voltage.is_finite() {
        Ok(())
    } else {
        Err(StoreError::InvalidSample(format!(
            "voltage must be finite, got {voltage}"
        )))
    }
}

pub(crate) fn next_id(records: &[CalibrationRecord]) -> u64 {
    records.iter().map(|r| r.id).max().unwrap_or(0) + 1
}
