//! Human-readable error descriptions and structured JSON error formatting.

use battcal_core::CalibrationError;
use battcal_store::StoreError;

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(ce) = err.downcast_ref::<CalibrationError>() {
        return match ce {
            CalibrationError::StoreRead(msg) => format!(
                "What happened: The calibration store could not be read ({msg}).\nLikely causes: Wrong store path, missing file, or insufficient permissions.\nHow to fix: Check store.path in the config (or --store) and that the file is readable."
            ),
            CalibrationError::StoreScan(msg) => format!(
                "What happened: A calibration sample could not be interpreted ({msg}).\nLikely causes: The store CSV was edited by hand or truncated.\nHow to fix: Fix or remove the offending row; every row needs id,voltage,percentage,recorded_at."
            ),
            CalibrationError::FitSingularity { expected, got } => format!(
                "What happened: The polynomial fit is singular (expected {expected} coefficients, got {got}).\nLikely causes: Two or more samples share the same voltage.\nHow to fix: Correct the duplicate sample with `battcal update` or add more samples with distinct voltages."
            ),
        };
    }

    if let Some(se) = err.downcast_ref::<StoreError>() {
        return match se {
            StoreError::NotFound(id) => format!(
                "What happened: No calibration sample with id {id}.\nLikely causes: The id was mistyped or belongs to another store.\nHow to fix: Run `battcal list` to see existing ids."
            ),
            StoreError::InvalidSample(msg) => format!(
                "What happened: The sample was rejected ({msg}).\nLikely causes: The voltage was NaN or infinite.\nHow to fix: Pass a finite voltage reading."
            ),
            StoreError::Malformed { line, reason } => format!(
                "What happened: The store file is malformed at line {line} ({reason}).\nLikely causes: The store CSV was edited by hand or truncated.\nHow to fix: Repair the row or restore the file from a backup."
            ),
            StoreError::Io(e) => format!(
                "What happened: Store I/O failed ({e}).\nLikely causes: Missing directory, read-only filesystem, or insufficient permissions.\nHow to fix: Check store.path in the config (or --store)."
            ),
        };
    }

    // String-based heuristics for errors coming from config or CSV loading
    let msg = err
        .chain()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(": ");
    let lower = msg.to_ascii_lowercase();

    if lower.contains("headers 'voltage,percentage'") {
        return "Invalid headers in sample CSV. Expected 'voltage,percentage'.".to_string();
    }

    if lower.contains("invalid csv row") || lower.contains("outside [0, 100]") {
        return format!(
            "What happened: The sample CSV has an invalid row.\nLikely causes: Non-numeric values, a non-finite voltage, or a percentage outside [0, 100].\nHow to fix: Fix the row and re-run the import. Original: {msg}"
        );
    }

    if lower.contains("config") {
        return format!(
            "What happened: Configuration is invalid ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file and try again."
        );
    }

    // Generic fallback
    format!(
        "Something went wrong.\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable reason name used in JSON error output.
pub fn reason_name(err: &eyre::Report) -> &'static str {
    if let Some(ce) = err.downcast_ref::<CalibrationError>() {
        return match ce {
            CalibrationError::StoreRead(_) => "StoreRead",
            CalibrationError::StoreScan(_) => "StoreScan",
            CalibrationError::FitSingularity { .. } => "FitSingularity",
        };
    }
    if let Some(se) = err.downcast_ref::<StoreError>() {
        return match se {
            StoreError::Io(_) => "StoreRead",
            StoreError::Malformed { .. } => "StoreScan",
            StoreError::NotFound(_) => "NotFound",
            StoreError::InvalidSample(_) => "InvalidSample",
        };
    }
    "Error"
}

/// Map calibration and store failures to stable exit codes; everything else returns 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match reason_name(err) {
        "StoreRead" => 3,
        "StoreScan" => 4,
        "FitSingularity" => 5,
        _ => 1,
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let reason = reason_name(err);
    let obj = match err.downcast_ref::<CalibrationError>() {
        Some(CalibrationError::FitSingularity { expected, got }) => json!({
            "reason": reason,
            "details": { "expected": expected, "got": got },
            "message": humanize(err),
        }),
        _ => json!({ "reason": reason, "message": humanize(err) }),
    };
    obj.to_string()
}
