//! Ordinary least-squares line.

use battcal_traits::CalibrationSample;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    #[inline]
    pub fn eval(&self, voltage: f64) -> f64 {
        self.slope * voltage + self.intercept
    }
}

/// Fit `percentage = slope * voltage + intercept` over all samples.
///
/// With two samples this is the line through both. When every sample shares
/// one voltage the X variance is zero; the slope is then defined as 0 and the
/// line sits at the mean percentage.
pub fn fit(samples: &[CalibrationSample]) -> LinearFit {
    debug_assert!(!samples.is_empty(), "linear fit needs at least one sample");
    let n = samples.len() as f64;
    let mean_x = samples.iter().map(|s| s.voltage).sum::<f64>() / n;
    let mean_y = samples.iter().map(|s| f64::from(s.percentage)).sum::<f64>() / n;

    // Centered sums; exactly zero when all voltages are identical
    let mut sxx = 0.0f64;
    let mut sxy = 0.0f64;
    for s in samples {
        let x = s.voltage - mean_x;
        sxx += x * x;
        sxy += x * (f64::from(s.percentage) - mean_y);
    }

    let slope = if sxx == 0.0 { 0.0 } else { sxy / sxx };
    LinearFit {
        slope,
        intercept: mean_y - slope * mean_x,
    }
}

#[cfg(test)]
mod tests {
    use super::fit;
    use battcal_traits::CalibrationSample as S;

    #[test]
    fn two_points_define_the_line() {
        let f = fit(&[S::new(10.0, 0), S::new(14.0, 100)]);
        assert_eq!(f.slope, 25.0);
        assert_eq!(f.intercept, -250.0);
        assert_eq!(f.eval(12.0), 50.0);
    }

    #[test]
    fn order_does_not_matter() {
        let a = fit(&[S::new(10.0, 0), S::new(14.0, 100)]);
        let b = fit(&[S::new(14.0, 100), S::new(10.0, 0)]);
        assert_eq!(a, b);
    }

    #[test]
    fn identical_voltages_give_flat_mean() {
        let f = fit(&[S::new(12.3, 40), S::new(12.3, 60)]);
        assert_eq!(f.slope, 0.0);
        assert_eq!(f.eval(0.0), 50.0);
        assert_eq!(f.eval(99.0), 50.0);
    }

    #[test]
    fn decreasing_line_is_supported() {
        let f = fit(&[S::new(2.0, 80), S::new(4.0, 40)]);
        assert_eq!(f.slope, -20.0);
        assert_eq!(f.eval(3.0), 60.0);
    }
}
