//! Maps `Box<dyn Error>` from the `SampleSource` boundary to typed `CalibrationError`.
//!
//! The trait in `battcal_traits` uses `Box<dyn Error + Send + Sync>` so any
//! store can sit behind it; this module sorts those errors into read failures
//! and scan failures, with an optional feature-gated path for
//! `battcal_store::StoreError` downcasting.

use crate::error::CalibrationError;

/// Map a trait-boundary error to a typed `CalibrationError`.
///
/// Attempts to downcast known store error types first, then falls back
/// to string-based heuristics.
pub fn map_source_error(e: &(dyn std::error::Error + 'static)) -> CalibrationError {
    // Feature-gated: try to downcast to StoreError for precise mapping
    #[cfg(feature = "store-errors")]
    {
        if let Some(se) = e.downcast_ref::<battcal_store::StoreError>() {
            return if se.is_malformed() {
                CalibrationError::StoreScan(se.to_string())
            } else {
                CalibrationError::StoreRead(se.to_string())
            };
        }
    }

    // Fallback: string-based detection
    let s = e.to_string();
    let lower = s.to_lowercase();
    if lower.contains("malformed") || lower.contains("scan") || lower.contains("deserializ") {
        CalibrationError::StoreScan(s)
    } else {
        CalibrationError::StoreRead(s)
    }
}
