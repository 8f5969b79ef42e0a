//! Closed-form voltage→percentage line used when calibration data is too thin.

/// `percentage = slope * voltage + intercept`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosedFormFallback {
    pub slope: f64,
    pub intercept: f64,
}

impl ClosedFormFallback {
    /// Reference device mapping: ~50.835 V reads empty, ~57.306 V reads full.
    pub const REFERENCE: Self = Self {
        slope: 170.0 / 11.0,
        intercept: -8642.0 / 11.0,
    };

    /// Line through two `(voltage, percentage)` anchors.
    ///
    /// Anchors at the same voltage yield a flat line at their mean percentage.
    pub fn from_anchors(empty: (f64, f64), full: (f64, f64)) -> Self {
        let dv = full.0 - empty.0;
        if dv == 0.0 {
            return Self {
                slope: 0.0,
                intercept: (empty.1 + full.1) / 2.0,
            };
        }
        let slope = (full.1 - empty.1) / dv;
        Self {
            slope,
            intercept: empty.1 - slope * empty.0,
        }
    }

    #[inline]
    pub fn eval(&self, voltage: f64) -> f64 {
        self.slope * voltage + self.intercept
    }
}

impl Default for ClosedFormFallback {
    fn default() -> Self {
        Self::REFERENCE
    }
}
