//! Test and helper sources for battcal_core

use battcal_traits::{CalibrationSample, SampleSource};

/// A source that always returns the same samples.
#[derive(Debug, Clone, Default)]
pub struct StaticSource(pub Vec<CalibrationSample>);

impl StaticSource {
    pub fn from_pairs(pairs: &[(f64, i32)]) -> Self {
        Self(
            pairs
                .iter()
                .map(|&(v, p)| CalibrationSample::new(v, p))
                .collect(),
        )
    }
}

impl SampleSource for StaticSource {
    fn read_samples(
        &self,
    ) -> Result<Vec<CalibrationSample>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.0.clone())
    }
}

/// A source that always errors with the given message; useful for driving
/// the error mapping without a real store.
#[derive(Debug, Clone)]
pub struct FailingSource(pub &'static str);

impl SampleSource for FailingSource {
    fn read_samples(
        &self,
    ) -> Result<Vec<CalibrationSample>, Box<dyn std::error::Error + Send + Sync>> {
        Err(Box::new(std::io::Error::other(self.0)))
    }
}
