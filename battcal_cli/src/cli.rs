//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

/// Config file tried when `--config` is not given; absence means built-in defaults.
pub const DEFAULT_CONFIG: &str = "etc/battcal.toml";

#[derive(Parser, Debug)]
#[command(name = "battcal", version, about = "Battery state-of-charge calibration")]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Sample store CSV; overrides store.path from the config
    #[arg(long, value_name = "FILE")]
    pub store: Option<PathBuf>,

    /// Emit JSON instead of plain text (output, logs, and errors)
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); RUST_LOG wins when set
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

fn parse_percentage(s: &str) -> Result<i32, String> {
    let p: i32 = s.parse().map_err(|e| format!("{e}"))?;
    if (0..=100).contains(&p) {
        Ok(p)
    } else {
        Err(format!("percentage must be within 0..=100, got {p}"))
    }
}

fn parse_voltage(s: &str) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(format!("voltage must be a finite number, got {s}"))
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Record a (voltage, percentage) calibration sample, then print all samples
    Add {
        #[arg(long, value_parser = parse_voltage, allow_negative_numbers = true)]
        voltage: f64,
        #[arg(long, value_parser = parse_percentage)]
        percentage: i32,
    },
    /// Correct an existing calibration sample
    Update {
        #[arg(long)]
        id: u64,
        #[arg(long, value_parser = parse_voltage, allow_negative_numbers = true)]
        voltage: f64,
        #[arg(long, value_parser = parse_percentage)]
        percentage: i32,
    },
    /// Print all calibration samples
    List,
    /// Bulk-insert samples from a `voltage,percentage` CSV
    Import {
        #[arg(long, value_name = "FILE")]
        csv: PathBuf,
    },
    /// Estimate the state of charge for a voltage reading
    Estimate {
        #[arg(long, value_parser = parse_voltage, allow_negative_numbers = true)]
        voltage: f64,
    },
    /// Calibrate every row of a telemetry CSV that has a `voltage` column
    Annotate {
        /// Input telemetry CSV
        #[arg(long, value_name = "FILE")]
        input: PathBuf,
        /// Output CSV (stdout when omitted)
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}
