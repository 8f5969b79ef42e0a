use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CalibrationError {
    /// The sample source could not be read at all.
    #[error("sample store read failed: {0}")]
    StoreRead(String),
    /// The source was read but a sample could not be interpreted.
    #[error("malformed calibration sample: {0}")]
    StoreScan(String),
    /// Degenerate abscissae (duplicate or near-duplicate voltages) in a polynomial fit.
    #[error("polynomial fit is singular: expected {expected} coefficients, got {got}")]
    FitSingularity { expected: usize, got: usize },
}

pub type Result<T> = std::result::Result<T, CalibrationError>;
