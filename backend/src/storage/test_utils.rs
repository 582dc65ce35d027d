//! In-memory appointment storage for unit tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use shared::dates::{format_canonical, parse_canonical_date};
use shared::{Appointment, AppointmentStatus};

use crate::storage::traits::{AppointmentStorage, NewAppointment, StorageError};

#[derive(Debug, Clone)]
struct StoredRow {
    id: String,
    /// Kept exactly as seeded so tests can store values with time components
    raw_date: String,
    status: AppointmentStatus,
}

/// Appointment table held in a `Vec`, with switches that make every select or
/// insert fail as if the remote service were down.
#[derive(Default)]
pub struct MemoryAppointmentStorage {
    rows: Mutex<Vec<StoredRow>>,
    fail_selects: AtomicBool,
    fail_inserts: AtomicBool,
}

impl MemoryAppointmentStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a row with a raw stored date value
    pub fn seed(&self, raw_date: &str, status: AppointmentStatus) {
        let mut rows = self.rows.lock().unwrap();
        let id = format!("seed-{}", rows.len());
        rows.push(StoredRow {
            id,
            raw_date: raw_date.to_string(),
            status,
        });
    }

    pub fn set_fail_selects(&self, fail: bool) {
        self.fail_selects.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    /// Number of rows, any status, stored for `date`
    pub fn row_count_for(&self, date: &str) -> usize {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .filter(|row| parse_canonical_date(&row.raw_date) == parse_canonical_date(date))
            .count()
    }

    fn check_selects(&self) -> Result<(), StorageError> {
        if self.fail_selects.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl AppointmentStorage for MemoryAppointmentStorage {
    async fn select_dates_by_status(&self, status: AppointmentStatus) -> Result<Vec<String>, StorageError> {
        self.check_selects()?;
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|row| row.status == status)
            .map(|row| row.raw_date.clone())
            .collect())
    }

    async fn select_ids_by_date(&self, date: &str, status: AppointmentStatus) -> Result<Vec<String>, StorageError> {
        self.check_selects()?;
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|row| row.status == status && parse_canonical_date(&row.raw_date) == parse_canonical_date(date))
            .map(|row| row.id.clone())
            .collect())
    }

    async fn insert_appointment(&self, appointment: &NewAppointment) -> Result<Appointment, StorageError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("insert rejected".to_string()));
        }

        let mut rows = self.rows.lock().unwrap();
        let id = format!("memory-{}", rows.len());
        rows.push(StoredRow {
            id: id.clone(),
            raw_date: format_canonical(appointment.appointment_date),
            status: appointment.status,
        });

        Ok(Appointment {
            id,
            appointment_date: appointment.appointment_date,
            client_name: appointment.client_name.clone(),
            client_email: appointment.client_email.clone(),
            status: appointment.status,
        })
    }
}
