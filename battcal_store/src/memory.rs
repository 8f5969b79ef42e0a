//! In-memory sample store, mainly for tests and embedding.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use battcal_traits::{CalibrationSample, SampleSource};
use chrono::Utc;

use crate::error::{Result, StoreError};
use crate::{CalibrationRecord, check_voltage, next_id};

#[derive(Default)]
pub struct MemorySampleStore {
    records: RwLock<Vec<CalibrationRecord>>,
}

impl MemorySampleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store from `(voltage, percentage)` pairs in order.
    pub fn with_samples(samples: impl IntoIterator<Item = (f64, i32)>) -> Result<Self> {
        let store = Self::new();
        for (v, p) in samples {
            store.insert(v, p)?;
        }
        Ok(store)
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<CalibrationRecord>> {
        self.records.read().unwrap_or_else(|p| p.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<CalibrationRecord>> {
        self.records.write().unwrap_or_else(|p| p.into_inner())
    }

    pub fn list(&self) -> Result<Vec<CalibrationRecord>> {
        Ok(self.read().clone())
    }

    pub fn get(&self, id: u64) -> Result<CalibrationRecord> {
        self.read()
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    pub fn insert(&self, voltage: f64, percentage: i32) -> Result<CalibrationRecord> {
        check_voltage(voltage)?;
        let mut records = self.write();
        let record = CalibrationRecord {
            id: next_id(&records),
            voltage,
            percentage,
            recorded_at: Utc::now(),
        };
        records.push(record.clone());
        Ok(record)
    }

    pub fn update(&self, id: u64, voltage: f64, percentage: i32) -> Result<CalibrationRecord> {
        check_voltage(voltage)?;
        let mut records = self.write();
        let rec = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(StoreError::NotFound(id))?;
        rec.voltage = voltage;
        rec.percentage = percentage;
        Ok(rec.clone())
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

impl SampleSource for MemorySampleStore {
    fn read_samples(
        &self,
    ) -> std::result::Result<Vec<CalibrationSample>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.read().iter().map(CalibrationRecord::sample).collect())
    }
}
