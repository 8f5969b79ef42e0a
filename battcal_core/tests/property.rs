use battcal_core::spline::knots_last_insert_wins;
use battcal_core::{
    CalibrationSample, ClosedFormFallback, Method, clamp, estimate_raw, estimate_samples,
};
use proptest::prelude::*;

// Voltages on a 0.25 V grid keep distinct knots well separated.
fn grid_voltage(k: u32) -> f64 {
    40.0 + f64::from(k) * 0.25
}

prop_compose! {
    fn samples_strategy(len: std::ops::Range<usize>)(
        pairs in prop::collection::vec((0u32..80, 0i32..=100), len),
    ) -> Vec<CalibrationSample> {
        pairs
            .into_iter()
            .map(|(k, p)| CalibrationSample::new(grid_voltage(k), p))
            .collect()
    }
}

prop_compose! {
    fn distinct_samples_strategy(len: std::ops::RangeInclusive<usize>)(
        ks in prop::sample::subsequence((0u32..80).collect::<Vec<_>>(), len),
    )(
        pcts in prop::collection::vec(0i32..=100, ks.len()),
        ks in Just(ks),
    ) -> Vec<CalibrationSample> {
        ks.into_iter()
            .zip(pcts)
            .map(|(k, p)| CalibrationSample::new(grid_voltage(k), p))
            .collect()
    }
}

proptest! {
    #[test]
    fn thin_data_uses_the_fallback(samples in samples_strategy(0..2), v in -100.0f64..200.0) {
        let fb = ClosedFormFallback::default();
        let est = estimate_samples(&samples, v, &fb).unwrap();
        prop_assert_eq!(est.method, Method::Fallback);
        prop_assert_eq!(est.percentage, clamp::to_percentage(fb.eval(v)));
    }

    #[test]
    fn two_samples_lie_on_their_line(
        samples in distinct_samples_strategy(2..=2),
        v in 30.0f64..70.0,
    ) {
        let (a, b) = (samples[0], samples[1]);
        let slope = f64::from(b.percentage - a.percentage) / (b.voltage - a.voltage);
        let expected = f64::from(a.percentage) + slope * (v - a.voltage);
        let (method, raw) = estimate_raw(&samples, v, &ClosedFormFallback::default()).unwrap();
        prop_assert_eq!(method, Method::Linear);
        let tol = 1e-6 * (1.0 + expected.abs());
        prop_assert!((raw - expected).abs() < tol, "{} vs {}", raw, expected);
    }

    #[test]
    fn polynomial_interpolates_its_samples(samples in distinct_samples_strategy(3..=4)) {
        let fb = ClosedFormFallback::default();
        for s in &samples {
            let (method, raw) = estimate_raw(&samples, s.voltage, &fb).unwrap();
            prop_assert_eq!(method, Method::Polynomial { degree: samples.len() - 1 });
            let want = f64::from(s.percentage);
            prop_assert!((raw - want).abs() < 1e-6, "{} vs {}", raw, want);
            let pct = estimate_samples(&samples, s.voltage, &fb).unwrap().percentage;
            prop_assert_eq!(i32::from(pct), s.percentage);
        }
    }

    #[test]
    fn spline_reproduces_deduplicated_knots(samples in samples_strategy(5..15)) {
        let fb = ClosedFormFallback::default();
        for (v, p) in knots_last_insert_wins(&samples) {
            let est = estimate_samples(&samples, v, &fb).unwrap();
            prop_assert_eq!(est.method, Method::Spline);
            prop_assert_eq!(f64::from(est.percentage), p);
        }
    }

    #[test]
    fn estimates_are_idempotent(samples in samples_strategy(0..12), v in 30.0f64..70.0) {
        let fb = ClosedFormFallback::default();
        // Duplicate voltages may make the 3..=4 case singular; that must repeat too
        let first = estimate_samples(&samples, v, &fb);
        let second = estimate_samples(&samples, v, &fb);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn result_is_clamped_to_bounds(samples in samples_strategy(0..12), v in -500.0f64..500.0) {
        let fb = ClosedFormFallback::default();
        if let Ok(est) = estimate_samples(&samples, v, &fb) {
            prop_assert!(est.percentage <= 100);
            if est.raw.is_finite() && est.raw < 0.0 {
                prop_assert_eq!(est.percentage, 0);
            }
            if est.raw.is_finite() && est.raw > 100.0 {
                prop_assert_eq!(est.percentage, 100);
            }
        }
    }
}
