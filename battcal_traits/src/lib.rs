//! Seam types shared by the calibration engine and its sample stores.

use std::sync::Arc;

/// One observed (voltage, percentage) pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationSample {
    pub voltage: f64,
    pub percentage: i32,
}

impl CalibrationSample {
    #[inline]
    pub const fn new(voltage: f64, percentage: i32) -> Self {
        Self {
            voltage,
            percentage,
        }
    }
}

/// Anything that can hand out the full set of calibration samples.
///
/// Implementations return samples in insertion order. Callers must not assume
/// the set is de-duplicated or sorted, nor that two reads observe the same
/// snapshot.
pub trait SampleSource {
    fn read_samples(
        &self,
    ) -> Result<Vec<CalibrationSample>, Box<dyn std::error::Error + Send + Sync>>;
}

impl<T: SampleSource + ?Sized> SampleSource for &T {
    fn read_samples(
        &self,
    ) -> Result<Vec<CalibrationSample>, Box<dyn std::error::Error + Send + Sync>> {
        (**self).read_samples()
    }
}

impl<T: SampleSource + ?Sized> SampleSource for Arc<T> {
    fn read_samples(
        &self,
    ) -> Result<Vec<CalibrationSample>, Box<dyn std::error::Error + Send + Sync>> {
        (**self).read_samples()
    }
}
