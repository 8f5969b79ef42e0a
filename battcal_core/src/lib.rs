#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cast_precision_loss,
    clippy::float_cmp
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Adaptive battery calibration engine (storage-agnostic).
//!
//! Turns a raw voltage into a state-of-charge percentage using whatever
//! calibration samples a `battcal_traits::SampleSource` currently holds.
//!
//! ## Architecture
//!
//! - **Selection**: `Method::for_count` picks the estimator from the sample count alone
//! - **Fallback**: fixed line for 0 or 1 samples (`fallback` module)
//! - **Linear**: least-squares line for 2 samples (`linear` module)
//! - **Polynomial**: degree `n - 1` least-squares fit for 3 or 4 samples (`polynomial` module)
//! - **Spline**: natural cubic spline for 5+ samples (`spline` module)
//! - **Clamp**: truncation to an integer in `[0, 100]` (`clamp` module)
//!
//! Every call re-reads the source; nothing is cached between calls and the
//! engine holds no mutable state, so one `Calibrator` can serve many threads.

pub mod clamp;
pub mod conversions;
pub mod error;
pub mod fallback;
pub mod linear;
pub mod method;
pub mod mocks;
pub mod polynomial;
pub mod source_error;
pub mod spline;

pub use battcal_traits::{CalibrationSample, SampleSource};
pub use error::{CalibrationError, Result};
pub use fallback::ClosedFormFallback;
pub use method::Method;
pub use spline::NaturalCubicSpline;

use crate::source_error::map_source_error;

/// Outcome of one calibration call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    /// Clamped percentage in `[0, 100]`.
    pub percentage: u8,
    /// Estimator output before truncation and clamping.
    pub raw: f64,
    pub method: Method,
    /// Number of samples the estimator was selected for.
    pub samples: usize,
}

/// Raw (unclamped) estimate at `voltage`, with the method that produced it.
pub fn estimate_raw(
    samples: &[CalibrationSample],
    voltage: f64,
    fallback: &ClosedFormFallback,
) -> Result<(Method, f64)> {
    let method = Method::for_count(samples.len());
    debug_assert!(samples.len() >= method.min_samples());
    let raw = match method {
        Method::Fallback => fallback.eval(voltage),
        Method::Linear => linear::fit(samples).eval(voltage),
        Method::Polynomial { degree } => polynomial::fit(samples, degree)?.eval(voltage),
        Method::Spline => NaturalCubicSpline::from_samples(samples).eval(voltage),
    };
    Ok((method, raw))
}

/// Pure calibration over an in-memory sample set.
pub fn estimate_samples(
    samples: &[CalibrationSample],
    voltage: f64,
    fallback: &ClosedFormFallback,
) -> Result<Estimate> {
    let (method, raw) = estimate_raw(samples, voltage, fallback)?;
    Ok(Estimate {
        percentage: clamp::to_percentage(raw),
        raw,
        method,
        samples: samples.len(),
    })
}

/// Calibration engine bound to a sample source.
#[derive(Debug, Clone)]
pub struct Calibrator<S> {
    source: S,
    fallback: ClosedFormFallback,
}

impl<S: SampleSource> Calibrator<S> {
    /// Engine using the reference fallback line.
    pub fn new(source: S) -> Self {
        Self {
            source,
            fallback: ClosedFormFallback::default(),
        }
    }

    #[must_use]
    pub fn with_fallback(mut self, fallback: ClosedFormFallback) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn fallback(&self) -> &ClosedFormFallback {
        &self.fallback
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Read the current samples and estimate the percentage at `voltage`.
    pub fn estimate_detailed(&self, voltage: f64) -> Result<Estimate> {
        let samples = self.source.read_samples().map_err(|e| {
            let mapped = map_source_error(&*e);
            tracing::error!(error = %mapped, "failed to read calibration samples");
            mapped
        })?;

        let est = estimate_samples(&samples, voltage, &self.fallback)?;
        tracing::debug!(
            voltage,
            samples = est.samples,
            method = est.method.name(),
            raw = est.raw,
            percentage = est.percentage,
            "calibrated battery percentage"
        );
        Ok(est)
    }

    /// Percentage in `[0, 100]` for `voltage`.
    pub fn estimate(&self, voltage: f64) -> Result<u8> {
        self.estimate_detailed(voltage).map(|e| e.percentage)
    }
}
