//! Natural cubic spline through de-duplicated, voltage-sorted knots.
//!
//! Extrapolation: queries outside the knot range evaluate the cubic of the
//! nearest boundary segment (first segment below, last segment above). Since
//! the end moments are zero this is neither a flat clamp nor a tangent line;
//! curvature picked up from the interior knots keeps acting past the ends.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use battcal_traits::CalibrationSample;

/// Voltage as an ordered map key (total order, `-0.0` folded into `0.0`).
#[derive(Debug, Clone, Copy)]
struct VoltageKey(f64);

impl VoltageKey {
    fn new(v: f64) -> Self {
        Self(v + 0.0)
    }
}

impl PartialEq for VoltageKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for VoltageKey {}

impl PartialOrd for VoltageKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VoltageKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Knot de-duplication policy: samples are visited in their original order
/// and inserted into a map keyed by voltage, so for any voltage the
/// last-inserted sample's percentage is the one kept. Knots come out sorted
/// by ascending voltage.
pub fn knots_last_insert_wins(samples: &[CalibrationSample]) -> Vec<(f64, f64)> {
    let mut by_voltage = BTreeMap::new();
    for s in samples {
        by_voltage.insert(VoltageKey::new(s.voltage), f64::from(s.percentage));
    }
    by_voltage.into_iter().map(|(k, y)| (k.0, y)).collect()
}

#[derive(Debug, Clone)]
pub struct NaturalCubicSpline {
    xs: Vec<f64>,
    ys: Vec<f64>,
    /// Second derivative at each knot; zero at both ends.
    moments: Vec<f64>,
}

impl NaturalCubicSpline {
    /// Build from raw samples using [`knots_last_insert_wins`].
    pub fn from_samples(samples: &[CalibrationSample]) -> Self {
        Self::from_knots(knots_last_insert_wins(samples))
    }

    /// Build from knots sorted by strictly increasing `x`.
    ///
    /// A single knot yields a constant; two knots yield the straight line
    /// through them.
    pub fn from_knots(knots: Vec<(f64, f64)>) -> Self {
        let (xs, ys): (Vec<f64>, Vec<f64>) = knots.into_iter().unzip();
        let moments = natural_moments(&xs, &ys);
        Self { xs, ys, moments }
    }

    pub fn knots(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.xs.iter().copied().zip(self.ys.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    pub fn eval(&self, x: f64) -> f64 {
        match self.xs.len() {
            0 => f64::NAN,
            1 => self.ys[0],
            n => {
                // Segment i covers [xs[i], xs[i+1]); ends extend outward
                let i = self
                    .xs
                    .partition_point(|&k| k <= x)
                    .saturating_sub(1)
                    .min(n - 2);
                self.eval_segment(i, x)
            }
        }
    }

    fn eval_segment(&self, i: usize, x: f64) -> f64 {
        let h = self.xs[i + 1] - self.xs[i];
        let (m0, m1) = (self.moments[i], self.moments[i + 1]);
        let b = (self.ys[i + 1] - self.ys[i]) / h - h * (2.0 * m0 + m1) / 6.0;
        let t = x - self.xs[i];
        self.ys[i] + t * (b + t * (m0 / 2.0 + t * (m1 - m0) / (6.0 * h)))
    }
}

/// Solve the tridiagonal system for knot second derivatives with zero
/// moments at both ends (Thomas algorithm).
fn natural_moments(xs: &[f64], ys: &[f64]) -> Vec<f64> {
    let n = xs.len();
    let mut m = vec![0.0f64; n];
    if n < 3 {
        return m;
    }

    let h: Vec<f64> = xs.windows(2).map(|w| w[1] - w[0]).collect();
    let interior = n - 2;
    let mut diag = vec![0.0f64; interior];
    let mut rhs = vec![0.0f64; interior];
    for r in 0..interior {
        let i = r + 1;
        diag[r] = 2.0 * (h[i - 1] + h[i]);
        rhs[r] = 6.0 * ((ys[i + 1] - ys[i]) / h[i] - (ys[i] - ys[i - 1]) / h[i - 1]);
    }

    // Forward sweep; the sub-diagonal of row r is h[r], the super-diagonal h[r + 1]
    for r in 1..interior {
        let w = h[r] / diag[r - 1];
        diag[r] -= w * h[r];
        rhs[r] -= w * rhs[r - 1];
    }
    // Back substitution into m[1..=n-2]
    for r in (0..interior).rev() {
        let upper = if r + 1 < interior {
            h[r + 1] * m[r + 2]
        } else {
            0.0
        };
        m[r + 1] = (rhs[r] - upper) / diag[r];
    }
    m
}
