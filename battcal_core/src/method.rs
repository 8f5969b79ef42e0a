//! Estimator selection by sample count.

use std::fmt;

/// The closed set of estimation strategies.
///
/// | samples | method |
/// |---|---|
/// | 0..=1 | `Fallback` |
/// | 2 | `Linear` |
/// | 3..=4 | `Polynomial { degree: n - 1 }` |
/// | 5.. | `Spline` |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Fallback,
    Linear,
    Polynomial { degree: usize },
    Spline,
}

impl Method {
    /// Pick the strategy for `n` samples. Depends on nothing but the count.
    pub const fn for_count(n: usize) -> Self {
        match n {
            0 | 1 => Method::Fallback,
            2 => Method::Linear,
            3 | 4 => Method::Polynomial { degree: n - 1 },
            _ => Method::Spline,
        }
    }

    /// Fewest samples this strategy may be invoked with.
    pub const fn min_samples(&self) -> usize {
        match self {
            Method::Fallback => 0,
            Method::Linear => 2,
            Method::Polynomial { degree } => *degree + 1,
            Method::Spline => 5,
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Method::Fallback => "fallback",
            Method::Linear => "linear",
            Method::Polynomial { .. } => "polynomial",
            Method::Spline => "spline",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Polynomial { degree } => write!(f, "polynomial(degree={degree})"),
            other => f.write_str(other.name()),
        }
    }
}
