//! Subcommand implementations: sample bookkeeping and calibration runs.

use std::io::Write;
use std::path::Path;

use battcal_core::{CalibrationSample, Calibrator, SampleSource};
use battcal_store::{CalibrationRecord, CsvSampleStore};
use eyre::{Result, WrapErr};
use serde_json::json;

fn print_records(out: &mut impl Write, records: &[CalibrationRecord], json: bool) -> Result<()> {
    if json {
        writeln!(out, "{}", serde_json::to_string(records)?)?;
        return Ok(());
    }
    writeln!(out, "{:>4}  {:>9}  {:>10}  recorded_at", "id", "voltage", "percentage")?;
    for r in records {
        writeln!(
            out,
            "{:>4}  {:>9.3}  {:>10}  {}",
            r.id,
            r.voltage,
            r.percentage,
            r.recorded_at.to_rfc3339()
        )?;
    }
    Ok(())
}

pub fn run_add(
    store: &CsvSampleStore,
    voltage: f64,
    percentage: i32,
    json: bool,
    out: &mut impl Write,
) -> Result<()> {
    store.insert(voltage, percentage)?;
    // Echo the whole table so the caller sees what the next estimate will use
    let records = store.list()?;
    print_records(out, &records, json)
}

pub fn run_update(
    store: &CsvSampleStore,
    id: u64,
    voltage: f64,
    percentage: i32,
    json: bool,
    out: &mut impl Write,
) -> Result<()> {
    let rec = store.update(id, voltage, percentage)?;
    print_records(out, std::slice::from_ref(&rec), json)
}

pub fn run_list(store: &CsvSampleStore, json: bool, out: &mut impl Write) -> Result<()> {
    let records = store.list()?;
    print_records(out, &records, json)
}

pub fn run_import(
    store: &CsvSampleStore,
    path: &Path,
    json: bool,
    out: &mut impl Write,
) -> Result<()> {
    let rows = battcal_config::load_samples_csv(path)?;
    for row in &rows {
        let s = CalibrationSample::from(row);
        store.insert(s.voltage, s.percentage)?;
    }
    tracing::info!(count = rows.len(), path = %path.display(), "imported calibration samples");
    if json {
        writeln!(out, "{}", json!({ "imported": rows.len() }))?;
    } else {
        writeln!(out, "Imported {} samples.", rows.len())?;
    }
    Ok(())
}

pub fn run_estimate<S: SampleSource>(
    cal: &Calibrator<S>,
    voltage: f64,
    json: bool,
    out: &mut impl Write,
) -> Result<()> {
    let est = cal.estimate_detailed(voltage)?;
    if json {
        let obj = json!({
            "voltage": voltage,
            "percentage": est.percentage,
            "raw": est.raw,
            "method": est.method.name(),
            "samples": est.samples,
        });
        writeln!(out, "{obj}")?;
    } else {
        writeln!(out, "{}", est.percentage)?;
    }
    Ok(())
}

/// Calibrate each row of `input`; a single bad row or failed estimate aborts the batch.
pub fn run_annotate<S: SampleSource>(
    cal: &Calibrator<S>,
    input: &Path,
    out: impl Write,
) -> Result<usize> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(input)
        .wrap_err_with(|| format!("open telemetry CSV {}", input.display()))?;
    let col = rdr
        .headers()?
        .iter()
        .position(|h| h.eq_ignore_ascii_case("voltage"))
        .ok_or_else(|| eyre::eyre!("telemetry CSV {} has no 'voltage' column", input.display()))?;

    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(["voltage", "percentage"])?;
    let mut n = 0usize;
    for (idx, rec) in rdr.records().enumerate() {
        let line = idx + 2;
        let rec = rec.wrap_err_with(|| format!("read telemetry row {line}"))?;
        let raw = rec.get(col).unwrap_or_default();
        let voltage: f64 = raw
            .parse()
            .map_err(|e| eyre::eyre!("invalid voltage {raw:?} at row {line}: {e}"))?;
        if !voltage.is_finite() {
            eyre::bail!("invalid voltage {raw:?} at row {line}: voltage must be finite");
        }
        let pct = cal
            .estimate(voltage)
            .wrap_err_with(|| format!("calibrating row {line}"))?;
        wtr.write_record([raw.to_string(), pct.to_string()])?;
        n += 1;
    }
    wtr.flush()?;
    tracing::info!(rows = n, input = %input.display(), "annotated telemetry");
    Ok(n)
}
