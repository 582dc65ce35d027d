//! # Storage Traits
//!
//! The row-oriented contract the availability store needs from the external
//! appointments table: filtered selects and a single insert. No updates or
//! deletes are issued by this application.

use async_trait::async_trait;
use chrono::NaiveDate;
use shared::{Appointment, AppointmentStatus};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The insert hit the one-scheduled-appointment-per-day constraint
    #[error("A scheduled appointment already exists for {0}")]
    DuplicateDate(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Values for a row about to be inserted
#[derive(Debug, Clone, PartialEq)]
pub struct NewAppointment {
    pub appointment_date: NaiveDate,
    pub client_name: String,
    pub client_email: String,
    pub status: AppointmentStatus,
}

/// Trait defining the interface for appointment storage operations
#[async_trait]
pub trait AppointmentStorage: Send + Sync {
    /// Raw `appointment_date` values of every row with the given status.
    /// Values are returned as stored and may carry a time component.
    async fn select_dates_by_status(&self, status: AppointmentStatus) -> Result<Vec<String>, StorageError>;

    /// IDs of rows whose date equals `date` (canonical `YYYY-MM-DD`) and whose status matches
    async fn select_ids_by_date(&self, date: &str, status: AppointmentStatus) -> Result<Vec<String>, StorageError>;

    /// Insert a new row, returning it with its generated ID
    async fn insert_appointment(&self, appointment: &NewAppointment) -> Result<Appointment, StorageError>;
}
