#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas and calibration-sample parsing for the battery calibrator.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - The sample CSV loader enforces headers and rejects the whole file on the
//!   first malformed row rather than skipping it.
use battcal_traits::CalibrationSample;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default on-disk location of the sample store.
pub const DEFAULT_STORE_PATH: &str = "var/battery_calibration.csv";

/// Reference device anchors: `percentage = (170/11)*v - 8642/11`.
pub const REFERENCE_EMPTY_VOLTAGE: f64 = 8642.0 / 170.0;
pub const REFERENCE_FULL_VOLTAGE: f64 = 9742.0 / 170.0;

/// Calibration sample CSV schema.
///
/// Expected headers:
/// voltage,percentage
///
/// Example:
/// voltage,percentage
/// 51.2,5
/// 56.9,97
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct SampleRow {
    pub voltage: f64,
    pub percentage: i32,
}

impl From<&SampleRow> for CalibrationSample {
    fn from(r: &SampleRow) -> Self {
        Self::new(r.voltage, r.percentage)
    }
}

impl From<SampleRow> for CalibrationSample {
    fn from(r: SampleRow) -> Self {
        Self::from(&r)
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StoreCfg {
    /// Path of the CSV file backing the sample store.
    pub path: PathBuf,
}

impl Default for StoreCfg {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_STORE_PATH),
        }
    }
}

/// Anchor points of the closed-form mapping used when fewer than two samples exist.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct FallbackCfg {
    /// Voltage reported by an empty pack
    pub empty_voltage: f64,
    /// Voltage reported by a full pack
    pub full_voltage: f64,
    pub empty_percentage: f64,
    pub full_percentage: f64,
}

impl Default for FallbackCfg {
    fn default() -> Self {
        Self {
            empty_voltage: REFERENCE_EMPTY_VOLTAGE,
            full_voltage: REFERENCE_FULL_VOLTAGE,
            empty_percentage: 0.0,
            full_percentage: 100.0,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub store: StoreCfg,
    /// Closed-form fallback anchors; defaults to the reference device.
    #[serde(default)]
    pub fallback: FallbackCfg,
    #[serde(default)]
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

const LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];
const ROTATIONS: [&str; 3] = ["never", "daily", "hourly"];

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Store
        if self.store.path.as_os_str().is_empty() {
            eyre::bail!("store.path must not be empty");
        }

        // Fallback
        let fb = &self.fallback;
        if !(fb.empty_voltage.is_finite() && fb.full_voltage.is_finite()) {
            eyre::bail!("fallback voltages must be finite");
        }
        if !(fb.empty_percentage.is_finite() && fb.full_percentage.is_finite()) {
            eyre::bail!("fallback percentages must be finite");
        }
        if fb.empty_voltage == fb.full_voltage {
            eyre::bail!("fallback.empty_voltage and fallback.full_voltage must differ");
        }

        // Logging
        if let Some(level) = self.logging.level.as_deref()
            && !LEVELS.contains(&level.to_ascii_lowercase().as_str())
        {
            eyre::bail!("logging.level must be one of error|warn|info|debug|trace, got {level}");
        }
        if let Some(rot) = self.logging.rotation.as_deref()
            && !ROTATIONS.contains(&rot.to_ascii_lowercase().as_str())
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly, got {rot}");
        }

        Ok(())
    }
}

/// Check a single row; `line` is the 1-based file line used in messages.
fn check_row(row: &SampleRow, line: usize) -> eyre::Result<()> {
    if !row.voltage.is_finite() {
        eyre::bail!("invalid CSV row {line}: voltage must be finite");
    }
    if !(0..=100).contains(&row.percentage) {
        eyre::bail!(
            "invalid CSV row {line}: percentage {} outside [0, 100]",
            row.percentage
        );
    }
    Ok(())
}

pub fn load_samples_csv(path: &Path) -> eyre::Result<Vec<SampleRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open sample CSV {:?}: {}", path, e))?;

    // Enforce exact headers
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let expected = ["voltage", "percentage"];
    let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
    if actual != expected {
        eyre::bail!(
            "sample CSV must have headers 'voltage,percentage', got: {}",
            actual.join(",")
        );
    }

    let mut rows = Vec::new();
    for (idx, rec) in rdr.deserialize::<SampleRow>().enumerate() {
        match rec {
            Ok(row) => {
                check_row(&row, idx + 2)?;
                rows.push(row);
            }
            Err(e) => {
                eyre::bail!("invalid CSV row {}: {}", idx + 2, e);
            }
        }
    }

    Ok(rows)
}
