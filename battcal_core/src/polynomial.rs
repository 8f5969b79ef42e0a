//! Least-squares polynomial fit.
//!
//! The system is assembled on a centred and scaled abscissa
//! `u = (v - mean) / spread` so that `u` stays in `[-1, 1]` and stays well
//! conditioned for voltages far from zero. With exactly `degree + 1` samples
//! the Vandermonde system is solved directly; more samples go through the
//! normal equations. The solution is also expanded back into plain powers of
//! the voltage for reporting.

use battcal_traits::CalibrationSample;

use crate::error::{CalibrationError, Result};

/// Pivots of the scaled system below this mark it singular. Voltages closer
/// than about this fraction of the sample spread count as duplicates.
const RANK_EPSILON: f64 = 1e-6;

/// `p(v) = coefficients[0] + coefficients[1]*v + ... + coefficients[d]*v^d`
#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial {
    coefficients: Vec<f64>,
    // Same polynomial in u = (v - mean) / scale
    centred: Vec<f64>,
    mean: f64,
    scale: f64,
}

impl Polynomial {
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn degree(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }

    /// Value of `Σ coefficients[i] * v^i`.
    ///
    /// Horner runs on the centred abscissa; the monomial form loses digits to
    /// cancellation at pack voltages around 50 V.
    pub fn eval(&self, voltage: f64) -> f64 {
        let u = (voltage - self.mean) / self.scale;
        self.centred.iter().rev().fold(0.0, |acc, c| acc * u + c)
    }
}

/// Fit a polynomial of `degree` to the samples by least squares.
///
/// With `degree + 1` samples at distinct voltages the fit interpolates every
/// sample. Returns `FitSingularity` when fewer than `degree + 1` independent
/// coefficients can be determined, e.g. duplicate voltages.
pub fn fit(samples: &[CalibrationSample], degree: usize) -> Result<Polynomial> {
    let m = degree + 1;
    let n = samples.len();
    if n < m {
        return Err(CalibrationError::FitSingularity {
            expected: m,
            got: n,
        });
    }

    let mean = samples.iter().map(|s| s.voltage).sum::<f64>() / n as f64;
    let spread = samples
        .iter()
        .map(|s| (s.voltage - mean).abs())
        .fold(0.0f64, f64::max);
    let scale = if spread > 0.0 && spread.is_finite() {
        spread
    } else {
        1.0
    };

    let rows: Vec<(Vec<f64>, f64)> = samples
        .iter()
        .map(|s| {
            let u = (s.voltage - mean) / scale;
            let powers = std::iter::successors(Some(1.0), |p| Some(p * u))
                .take(m)
                .collect();
            (powers, f64::from(s.percentage))
        })
        .collect();

    let (a, tol) = if n == m {
        // Square Vandermonde system [A | y]: interpolation, solved directly
        let a: Vec<Vec<f64>> = rows
            .into_iter()
            .map(|(mut row, y)| {
                row.push(y);
                row
            })
            .collect();
        (a, RANK_EPSILON)
    } else {
        // Normal equations [AᵀA | Aᵀy]; their pivots are squares of the direct ones
        let mut a = vec![vec![0.0f64; m + 1]; m];
        for (powers, y) in &rows {
            for (j, row) in a.iter_mut().enumerate() {
                for k in 0..m {
                    row[k] += powers[j] * powers[k];
                }
                row[m] += y * powers[j];
            }
        }
        (a, RANK_EPSILON * RANK_EPSILON * n as f64)
    };

    let scaled = solve(a, tol).map_err(|rank| {
        tracing::warn!(expected = m, rank, "singular polynomial fit");
        CalibrationError::FitSingularity { expected: m, got: rank }
    })?;

    let coefficients = expand(&scaled, mean, scale);
    let finite = scaled.iter().filter(|c| c.is_finite()).count();
    if coefficients.len() != m || finite != m {
        return Err(CalibrationError::FitSingularity {
            expected: m,
            got: finite,
        });
    }
    Ok(Polynomial {
        coefficients,
        centred: scaled,
        mean,
        scale,
    })
}

/// Gaussian elimination with partial pivoting on an augmented square system.
/// On failure returns the number of usable pivots found before the breakdown.
fn solve(mut a: Vec<Vec<f64>>, tol: f64) -> std::result::Result<Vec<f64>, usize> {
    let m = a.len();
    for col in 0..m {
        let pivot_row = (col..m)
            .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
            .unwrap_or(col);
        let pivot = a[pivot_row][col];
        if !(pivot.abs() > tol) {
            return Err(col);
        }
        a.swap(col, pivot_row);
        for row in col + 1..m {
            let factor = a[row][col] / pivot;
            if factor == 0.0 {
                continue;
            }
            for k in col..=m {
                a[row][k] -= factor * a[col][k];
            }
        }
    }

    let mut x = vec![0.0f64; m];
    for row in (0..m).rev() {
        let tail: f64 = (row + 1..m).map(|k| a[row][k] * x[k]).sum();
        x[row] = (a[row][m] - tail) / a[row][row];
    }
    Ok(x)
}

/// Rewrite `Σ d[j] * ((v - mean) / scale)^j` as `Σ c[k] * v^k`.
fn expand(d: &[f64], mean: f64, scale: f64) -> Vec<f64> {
    let m = d.len();
    let mut c = vec![0.0f64; m];
    // (v - mean)^j, built up one factor at a time
    let mut basis = vec![0.0f64; m];
    basis[0] = 1.0;
    let mut inv_scale_pow = 1.0;
    for (j, dj) in d.iter().enumerate() {
        if j > 0 {
            for k in (1..=j).rev() {
                basis[k] = basis[k - 1] - mean * basis[k];
            }
            basis[0] *= -mean;
            inv_scale_pow /= scale;
        }
        let w = dj * inv_scale_pow;
        for k in 0..=j {
            c[k] += w * basis[k];
        }
    }
    c
}

#[cfg(test)]
mod tests {
    use super::{expand, fit};
    use crate::error::CalibrationError;
    use battcal_traits::CalibrationSample as S;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn expand_recovers_monomial_coefficients() {
        // (v - 2)^2 / 4 = 1 - v + v^2/4
        let c = expand(&[0.0, 0.0, 1.0], 2.0, 2.0);
        assert!(close(c[0], 1.0) && close(c[1], -1.0) && close(c[2], 0.25));
    }

    #[test]
    fn quadratic_through_three_points_is_exact() {
        // p(v) = 2 + 3v + v^2
        let pts: Vec<S> = [0.0, 1.0, 3.0]
            .iter()
            .map(|&v: &f64| S::new(v, (2.0 + 3.0 * v + v * v) as i32))
            .collect();
        let p = fit(&pts, 2).unwrap();
        assert_eq!(p.degree(), 2);
        let c = p.coefficients();
        assert!(close(c[0], 2.0) && close(c[1], 3.0) && close(c[2], 1.0), "{c:?}");
        let monomial = |v: f64| c.iter().rev().fold(0.0, |acc, k| acc * v + k);
        for v in [-1.0, 0.5, 2.0, 4.0] {
            assert!(close(p.eval(v), monomial(v)), "at {v}");
        }
    }

    #[test]
    fn cubic_interpolates_at_battery_voltages() {
        let pts = [S::new(51.0, 3), S::new(53.2, 41), S::new(55.1, 77), S::new(57.0, 99)];
        let p = fit(&pts, 3).unwrap();
        assert_eq!(p.coefficients().len(), 4);
        for s in &pts {
            let y = p.eval(s.voltage);
            assert!((y - f64::from(s.percentage)).abs() < 1e-6, "{y} vs {}", s.percentage);
        }
    }

    #[test]
    fn overdetermined_line_is_least_squares() {
        // OLS through (0,0), (1,1), (2,2), (3,4): slope 1.3, intercept -0.2
        let pts = [S::new(0.0, 0), S::new(1.0, 1), S::new(2.0, 2), S::new(3.0, 4)];
        let p = fit(&pts, 1).unwrap();
        assert_eq!(p.degree(), 1);
        let c = p.coefficients();
        assert!(close(c[0], -0.2) && close(c[1], 1.3), "{c:?}");
        assert!(close(p.eval(1.5), 1.75));
    }

    #[test]
    fn overdetermined_exact_parabola_is_recovered() {
        // p(v) = 5 + 2(v - 50) + (v - 50)^2 at five pack voltages
        let pts: Vec<S> = [48.0, 49.0, 50.0, 51.0, 53.0]
            .iter()
            .map(|&v: &f64| S::new(v, (5.0 + 2.0 * (v - 50.0) + (v - 50.0).powi(2)) as i32))
            .collect();
        let p = fit(&pts, 2).unwrap();
        for s in &pts {
            assert!((p.eval(s.voltage) - f64::from(s.percentage)).abs() < 1e-9);
        }
        assert!((p.eval(52.0) - 13.0).abs() < 1e-9);
    }

    #[test]
    fn overdetermined_with_one_voltage_is_singular() {
        let pts = [S::new(12.0, 40), S::new(12.0, 60), S::new(12.0, 80)];
        assert!(matches!(
            fit(&pts, 1),
            Err(CalibrationError::FitSingularity { expected: 2, got: 1 })
        ));
    }

    #[test]
    fn duplicate_voltages_are_singular() {
        let pts = [S::new(12.0, 40), S::new(12.0, 60), S::new(13.0, 80)];
        let err = fit(&pts, 2).expect_err("rank deficient");
        assert_eq!(
            err,
            CalibrationError::FitSingularity {
                expected: 3,
                got: 2
            }
        );
    }

    #[test]
    fn near_duplicate_voltages_are_singular() {
        let pts = [
            S::new(12.0, 40),
            S::new(12.0 + 1e-9, 60),
            S::new(13.0, 80),
            S::new(14.0, 90),
        ];
        assert!(matches!(
            fit(&pts, 3),
            Err(CalibrationError::FitSingularity { expected: 4, .. })
        ));
    }

    #[test]
    fn all_same_voltage_is_singular() {
        let pts = [S::new(12.0, 40), S::new(12.0, 60), S::new(12.0, 80)];
        assert!(matches!(
            fit(&pts, 2),
            Err(CalibrationError::FitSingularity { expected: 3, got: 1 })
        ));
    }

    #[test]
    fn too_few_samples_for_degree() {
        assert!(matches!(
            fit(&[S::new(1.0, 1)], 2),
            Err(CalibrationError::FitSingularity { expected: 3, got: 1 })
        ));
    }
}
