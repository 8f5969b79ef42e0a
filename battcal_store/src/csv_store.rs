//! CSV-file backed sample store.
//!
//! Layout: a header row `id,voltage,percentage,recorded_at` followed by one row
//! per record. Inserts append; updates rewrite the file through a temporary
//! sibling and an atomic rename, so a concurrent reader sees either the old or
//! the new table, never a mix.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use battcal_traits::{CalibrationSample, SampleSource};
use chrono::Utc;

use crate::error::{Result, StoreError};
use crate::{CalibrationRecord, check_voltage, next_id};

const HEADER: [&str; 4] = ["id", "voltage", "percentage", "recorded_at"];

pub struct CsvSampleStore {
    path: PathBuf,
    // Serializes writers (and readers against a half-appended row) within one process.
    lock: Mutex<()>,
}

impl CsvSampleStore {
    /// Open the store at `path`, creating parent directories and a
    /// header-only file when it does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                fs::create_dir_all(parent)?;
            }
            let mut wtr = csv::Writer::from_path(&path).map_err(StoreError::from_csv)?;
            wtr.write_record(HEADER).map_err(StoreError::from_csv)?;
            wtr.flush()?;
            tracing::info!(path = %path.display(), "created calibration store");
        }
        Ok(Self {
            path,
            lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn read_records(&self) -> Result<Vec<CalibrationRecord>> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&self.path)
            .map_err(StoreError::from_csv)?;

        let headers = rdr.headers().map_err(StoreError::from_csv)?;
        if headers.iter().ne(HEADER.iter().copied()) {
            return Err(StoreError::Malformed {
                line: 1,
                reason: format!(
                    "expected header '{}', got '{}'",
                    HEADER.join(","),
                    headers.iter().collect::<Vec<_>>().join(",")
                ),
            });
        }

        let mut records = Vec::new();
        for rec in rdr.deserialize::<CalibrationRecord>() {
            let rec = rec.map_err(StoreError::from_csv)?;
            if !rec.voltage.is_finite() {
                return Err(StoreError::Malformed {
                    line: records.len() as u64 + 2,
                    reason: format!("record {} has non-finite voltage", rec.id),
                });
            }
            records.push(rec);
        }
        tracing::debug!(
            count = records.len(),
            path = %self.path.display(),
            "read calibration records"
        );
        Ok(records)
    }

    fn write_all(&self, records: &[CalibrationRecord]) -> Result<()> {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        {
            let mut wtr = csv::Writer::from_path(&tmp).map_err(StoreError::from_csv)?;
            for r in records {
                wtr.serialize(r).map_err(StoreError::from_csv)?;
            }
            wtr.flush()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// All records in insertion order.
    pub fn list(&self) -> Result<Vec<CalibrationRecord>> {
        let _g = self.guard();
        self.read_records()
    }

    pub fn get(&self, id: u64) -> Result<CalibrationRecord> {
        self.list()?
            .into_iter()
            .find(|r| r.id == id)
            .ok_or(StoreError::NotFound(id))
    }

    pub fn insert(&self, voltage: f64, percentage: i32) -> Result<CalibrationRecord> {
        check_voltage(voltage)?;
        let _g = self.guard();
        let records = self.read_records()?;
        let record = CalibrationRecord {
            id: next_id(&records),
            voltage,
            percentage,
            recorded_at: Utc::now(),
        };

        let file = OpenOptions::new().append(true).open(&self.path)?;
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        wtr.serialize(&record).map_err(StoreError::from_csv)?;
        wtr.flush()?;

        tracing::info!(id = record.id, voltage, percentage, "inserted calibration sample");
        Ok(record)
    }

    /// Replace voltage and percentage of record `id`, keeping its timestamp.
    pub fn update(&self, id: u64, voltage: f64, percentage: i32) -> Result<CalibrationRecord> {
        check_voltage(voltage)?;
        let _g = self.guard();
        let mut records = self.read_records()?;
        let rec = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(StoreError::NotFound(id))?;
        rec.voltage = voltage;
        rec.percentage = percentage;
        let updated = rec.clone();

        self.write_all(&records)?;
        tracing::info!(id, voltage, percentage, "updated calibration sample");
        Ok(updated)
    }
}

impl SampleSource for CsvSampleStore {
    fn read_samples(
        &self,
    ) -> std::result::Result<Vec<CalibrationSample>, Box<dyn std::error::Error + Send + Sync>> {
        let records = self.list()?;
        Ok(records.iter().map(CalibrationRecord::sample).collect())
    }
}
