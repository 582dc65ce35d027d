//! # Storage Module
//!
//! Access to the appointments table. The domain layer only sees the
//! [`AppointmentStorage`] trait; the SQLite implementation is injected at
//! startup, and tests swap in an in-memory double.

pub mod sqlite;
pub mod traits;

#[cfg(test)]
pub mod test_utils;

pub use sqlite::SqliteAppointmentStorage;
pub use traits::{AppointmentStorage, NewAppointment, StorageError};
