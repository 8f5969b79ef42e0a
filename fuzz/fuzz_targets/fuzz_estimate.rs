#![no_main]
use battcal_core::{CalibrationSample, ClosedFormFallback, estimate_samples};
use libfuzzer_sys::{arbitrary, fuzz_target};

#[derive(Debug, arbitrary::Arbitrary)]
struct Input {
    samples: Vec<(f64, i8)>,
    voltage: f64,
}

fuzz_target!(|input: Input| {
    let samples: Vec<CalibrationSample> = input
        .samples
        .iter()
        .take(64)
        .filter(|(v, _)| v.is_finite())
        .map(|&(v, p)| CalibrationSample::new(v, i32::from(p).clamp(0, 100)))
        .collect();
    let fb = ClosedFormFallback::default();
    // Any sample set either yields a bounded percentage or a typed error
    if let Ok(est) = estimate_samples(&samples, input.voltage, &fb) {
        assert!(est.percentage <= 100);
    }
});
