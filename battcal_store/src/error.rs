use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed calibration record at line {line}: {reason}")]
    Malformed { line: u64, reason: String },
    #[error("calibration record {0} not found")]
    NotFound(u64),
    #[error("invalid calibration sample: {0}")]
    InvalidSample(String),
}

impl StoreError {
    /// True when the store was readable but a row could not be interpreted.
    pub fn is_malformed(&self) -> bool {
        matches!(self, StoreError::Malformed { .. })
    }

    /// Split a csv error into an I/O failure or a malformed-row failure.
    pub(crate) fn from_csv(e: csv::Error) -> Self {
        let line = e.position().map(|p| p.line()).unwrap_or(0);
        let reason = e.to_string();
        match e.into_kind() {
            csv::ErrorKind::Io(io) => StoreError::Io(io),
            _ => StoreError::Malformed { line, reason },
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
