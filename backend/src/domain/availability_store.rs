//! Availability store: the booked-date snapshot plus the booking operation.
//!
//! The store owns no data of its own. Every load rebuilds the booked-date set
//! from the appointments table, and every booking re-loads before it reports
//! success so the snapshot already contains the new date.
//!
//! The duplicate check before the insert is advisory. Two concurrent requests
//! can both pass it; the unique index on scheduled dates rejects the second
//! insert, and that rejection is reported exactly like a failed pre-check.
//!
//! Loads may overlap, for example the first load triggered by the calendar
//! window and the re-load after a booking. Only the most recently started load
//! publishes into the snapshot.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::Datelike;
use shared::calendar::is_bookable_weekday;
use shared::dates::{format_canonical, parse_canonical_date};
use shared::{
    Appointment, AppointmentStatus, AvailabilitySnapshot, BookedDateSet, CreateAppointmentResponse, LoadGeneration,
};
use tokio::sync::OnceCell;
use tracing::{debug, error, info, warn};

use crate::storage::{AppointmentStorage, NewAppointment, StorageError};

/// Shown when a load fails without a usable description
pub const FETCH_FALLBACK_MESSAGE: &str = "An error occurred while loading appointments";
/// Shown when a booking fails without a usable description
pub const CREATE_FALLBACK_MESSAGE: &str = "An error occurred while creating the appointment";

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("{0}")]
    Fetch(#[source] StorageError),
    #[error("Invalid appointment date: {0:?}")]
    InvalidDate(String),
    #[error("{0}")]
    InvalidClient(&'static str),
    #[error("This date is already booked. Please choose another date.")]
    DateAlreadyBooked,
    #[error("{0}")]
    Storage(#[from] StorageError),
}

impl BookingError {
    /// Human-readable message, never empty
    pub fn user_message(&self) -> String {
        let message = self.to_string();
        if !message.trim().is_empty() {
            return message;
        }
        match self {
            BookingError::Fetch(_) => FETCH_FALLBACK_MESSAGE.to_string(),
            _ => CREATE_FALLBACK_MESSAGE.to_string(),
        }
    }
}

/// Booked dates, loading flag and last error, backed by injected storage.
///
/// Clones share the same snapshot.
#[derive(Clone)]
pub struct AvailabilityStore {
    storage: Arc<dyn AppointmentStorage>,
    snapshot: Arc<RwLock<AvailabilitySnapshot>>,
    load_generation: Arc<LoadGeneration>,
    initial_load: Arc<OnceCell<()>>,
}

impl AvailabilityStore {
    pub fn new(storage: Arc<dyn AppointmentStorage>) -> Self {
        Self {
            storage,
            snapshot: Arc::new(RwLock::new(AvailabilitySnapshot::initial())),
            load_generation: Arc::new(LoadGeneration::new()),
            initial_load: Arc::new(OnceCell::new()),
        }
    }

    /// Current booked dates, loading flag and error
    pub fn snapshot(&self) -> AvailabilitySnapshot {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Run the first load if no load has been started yet
    pub async fn ensure_loaded(&self) {
        self.initial_load
            .get_or_init(|| async {
                // Failures are recorded in the snapshot
                let _ = self.load_booked_dates().await;
            })
            .await;
    }

    /// Re-query scheduled appointments and replace the booked-date set.
    ///
    /// On failure the previous set is kept and the error is recorded. Either
    /// way loading is over once this returns, unless a newer load started in
    /// the meantime: then this result is returned to the caller but not
    /// published, and the newer load owns the snapshot.
    pub async fn load_booked_dates(&self) -> Result<BookedDateSet, BookingError> {
        let ticket = self.load_generation.begin();
        let result = self.storage.select_dates_by_status(AppointmentStatus::Scheduled).await;

        match result {
            Ok(raw_dates) => {
                let booked: BookedDateSet = raw_dates
                    .iter()
                    .filter_map(|raw| {
                        let parsed = parse_canonical_date(raw);
                        if parsed.is_none() {
                            warn!("Skipping unparseable appointment date {:?}", raw);
                        }
                        parsed
                    })
                    .collect();

                info!("Loaded {} booked dates", booked.len());

                let mut snapshot = self.snapshot.write().unwrap_or_else(PoisonError::into_inner);
                if !self.load_generation.is_current(ticket) {
                    debug!("Discarding booked dates from superseded load {}", ticket);
                    return Ok(booked);
                }
                snapshot.booked_dates = booked.clone();
                snapshot.loading = false;
                snapshot.error = None;

                Ok(booked)
            }
            Err(e) => {
                let err = BookingError::Fetch(e);
                error!("Failed to load booked dates: {}", err);

                let mut snapshot = self.snapshot.write().unwrap_or_else(PoisonError::into_inner);
                if !self.load_generation.is_current(ticket) {
                    debug!("Discarding error from superseded load {}", ticket);
                    return Err(err);
                }
                snapshot.loading = false;
                snapshot.error = Some(err.user_message());

                Err(err)
            }
        }
    }

    /// Book `date` for the given client, reporting the outcome as a result value
    pub async fn create_appointment(&self, date: &str, client_name: &str, client_email: &str) -> CreateAppointmentResponse {
        match self.try_create_appointment(date, client_name, client_email).await {
            Ok(_) => CreateAppointmentResponse::succeeded(),
            Err(e) => CreateAppointmentResponse::failed(e.user_message()),
        }
    }

    /// Book `date` for the given client.
    ///
    /// The date is normalized to `YYYY-MM-DD` before it is checked or stored.
    /// Weekday and past-date rules belong to the calendar; a request for a
    /// closed weekday or a past day is still booked here.
    /// After a successful insert the booked dates are re-loaded; a failure of
    /// that re-load is recorded in the snapshot but does not undo the booking.
    pub async fn try_create_appointment(
        &self,
        date: &str,
        client_name: &str,
        client_email: &str,
    ) -> Result<Appointment, BookingError> {
        let appointment_date =
            parse_canonical_date(date).ok_or_else(|| BookingError::InvalidDate(date.to_string()))?;
        let canonical = format_canonical(appointment_date);
        if !is_bookable_weekday(appointment_date.weekday()) {
            debug!("Booking requested for {} which is outside Monday to Thursday", canonical);
        }

        let client_name = client_name.trim();
        let client_email = client_email.trim();
        if client_name.is_empty() {
            return Err(BookingError::InvalidClient("Client name is required"));
        }
        if !client_email.contains('@') {
            return Err(BookingError::InvalidClient("A valid client email is required"));
        }

        let existing = self
            .storage
            .select_ids_by_date(&canonical, AppointmentStatus::Scheduled)
            .await?;
        if !existing.is_empty() {
            info!("Rejected booking for {}: {} scheduled appointment(s) exist", canonical, existing.len());
            return Err(BookingError::DateAlreadyBooked);
        }

        let new_appointment = NewAppointment {
            appointment_date,
            client_name: client_name.to_string(),
            client_email: client_email.to_string(),
            status: AppointmentStatus::Scheduled,
        };

        let appointment = match self.storage.insert_appointment(&new_appointment).await {
            Ok(appointment) => appointment,
            Err(StorageError::DuplicateDate(_)) => {
                warn!("Booking for {} lost a race with a concurrent booking", canonical);
                return Err(BookingError::DateAlreadyBooked);
            }
            Err(e) => {
                error!("Failed to insert appointment for {}: {}", canonical, e);
                return Err(e.into());
            }
        };

        info!("Booked appointment {} for {}", appointment.id, canonical);

        let _ = self.load_booked_dates().await;

        Ok(appointment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbConnection;
    use crate::storage::test_utils::MemoryAppointmentStorage;
    use crate::storage::SqliteAppointmentStorage;
    use async_trait::async_trait;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn memory_store() -> (Arc<MemoryAppointmentStorage>, AvailabilityStore) {
        let storage = Arc::new(MemoryAppointmentStorage::new());
        let store = AvailabilityStore::new(storage.clone());
        (storage, store)
    }

    #[tokio::test]
    async fn test_initial_snapshot_is_loading() {
        let (_storage, store) = memory_store();
        let snapshot = store.snapshot();
        assert!(snapshot.loading);
        assert!(snapshot.booked_dates.is_empty());
        assert!(snapshot.error.is_none());
    }

    #[tokio::test]
    async fn test_load_only_counts_scheduled_rows() {
        let (storage, store) = memory_store();
        storage.seed("2024-06-10", AppointmentStatus::Scheduled);
        storage.seed("2024-06-11", AppointmentStatus::Cancelled);
        storage.seed("2024-06-12", AppointmentStatus::Completed);

        let booked = store.load_booked_dates().await.unwrap();

        assert_eq!(booked.iter().copied().collect::<Vec<_>>(), vec![date(2024, 6, 10)]);
        let snapshot = store.snapshot();
        assert!(!snapshot.loading);
        assert_eq!(snapshot.booked_dates, booked);
    }

    #[tokio::test]
    async fn test_load_ignores_time_components_and_skips_garbage() {
        let (storage, store) = memory_store();
        storage.seed("2024-06-10T15:00:00Z", AppointmentStatus::Scheduled);
        storage.seed("not a date", AppointmentStatus::Scheduled);

        let booked = store.load_booked_dates().await.unwrap();

        assert_eq!(booked.len(), 1);
        assert!(booked.contains(date(2024, 6, 10)));
    }

    #[tokio::test]
    async fn test_failed_initial_load_sets_error_and_stops_loading() {
        let (storage, store) = memory_store();
        storage.set_fail_selects(true);

        let result = store.load_booked_dates().await;

        assert!(matches!(result, Err(BookingError::Fetch(_))));
        let snapshot = store.snapshot();
        assert!(!snapshot.loading);
        assert!(snapshot.booked_dates.is_empty());
        let message = snapshot.error.expect("error message should be set");
        assert!(message.contains("connection refused"), "unexpected message: {}", message);
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_last_good_dates() {
        let (storage, store) = memory_store();
        storage.seed("2024-06-10", AppointmentStatus::Scheduled);
        store.load_booked_dates().await.unwrap();

        storage.set_fail_selects(true);
        assert!(store.load_booked_dates().await.is_err());

        let snapshot = store.snapshot();
        assert!(snapshot.booked_dates.contains(date(2024, 6, 10)));
        assert!(snapshot.error.is_some());

        storage.set_fail_selects(false);
        store.load_booked_dates().await.unwrap();
        assert!(store.snapshot().error.is_none());
    }

    #[tokio::test]
    async fn test_ensure_loaded_runs_once() {
        let (storage, store) = memory_store();
        storage.seed("2024-06-10", AppointmentStatus::Scheduled);
        store.ensure_loaded().await;
        assert_eq!(store.snapshot().booked_dates.len(), 1);

        storage.seed("2024-06-11", AppointmentStatus::Scheduled);
        store.clone().ensure_loaded().await;
        assert_eq!(store.snapshot().booked_dates.len(), 1);

        store.load_booked_dates().await.unwrap();
        assert_eq!(store.snapshot().booked_dates.len(), 2);
    }

    #[tokio::test]
    async fn test_create_for_booked_date_fails_without_duplicate_row() {
        let (storage, store) = memory_store();
        storage.seed("2024-06-11T09:30:00Z", AppointmentStatus::Scheduled);
        store.load_booked_dates().await.unwrap();

        let response = store.create_appointment("2024-06-11", "Grace Hopper", "grace@example.com").await;

        assert!(!response.success);
        let message = response.error.expect("failure carries a message");
        assert!(!message.is_empty());
        assert!(message.contains("already booked"));
        assert_eq!(storage.row_count_for("2024-06-11"), 1);
    }

    #[tokio::test]
    async fn test_create_for_free_date_succeeds_and_refreshes() {
        let (storage, store) = memory_store();
        store.load_booked_dates().await.unwrap();

        let response = store.create_appointment("2024-06-12", "Grace Hopper", "grace@example.com").await;

        assert_eq!(response, CreateAppointmentResponse::succeeded());
        assert!(store.snapshot().booked_dates.contains(date(2024, 6, 12)));
        assert!(store.load_booked_dates().await.unwrap().contains(date(2024, 6, 12)));
        assert_eq!(storage.row_count_for("2024-06-12"), 1);
    }

    #[tokio::test]
    async fn test_create_normalizes_timestamp_input() {
        let (_storage, store) = memory_store();

        let appointment = store
            .try_create_appointment("2024-06-13T23:30:00-04:00", "  Grace Hopper ", "grace@example.com")
            .await
            .unwrap();

        assert_eq!(appointment.appointment_date, date(2024, 6, 13));
        assert_eq!(appointment.client_name, "Grace Hopper");
        assert_eq!(appointment.status, AppointmentStatus::Scheduled);
    }

    #[tokio::test]
    async fn test_cancelled_appointment_does_not_block_date() {
        let (storage, store) = memory_store();
        storage.seed("2024-06-13", AppointmentStatus::Cancelled);

        let response = store.create_appointment("2024-06-13", "Grace Hopper", "grace@example.com").await;
        assert!(response.success);
    }

    #[tokio::test]
    async fn test_invalid_input_is_rejected() {
        let (storage, store) = memory_store();

        let bad_date = store.try_create_appointment("13/06/2024", "Grace", "grace@example.com").await;
        assert!(matches!(bad_date, Err(BookingError::InvalidDate(_))));

        let no_name = store.try_create_appointment("2024-06-13", "   ", "grace@example.com").await;
        assert!(matches!(no_name, Err(BookingError::InvalidClient(_))));

        let bad_email = store.try_create_appointment("2024-06-13", "Grace", "grace.example.com").await;
        assert!(matches!(bad_email, Err(BookingError::InvalidClient(_))));

        assert_eq!(storage.row_count_for("2024-06-13"), 0);
    }

    #[tokio::test]
    async fn test_insert_failure_reports_underlying_error() {
        let (storage, store) = memory_store();
        storage.set_fail_inserts(true);

        let response = store.create_appointment("2024-06-12", "Grace Hopper", "grace@example.com").await;

        assert!(!response.success);
        assert_eq!(response.error.as_deref(), Some("Storage unavailable: insert rejected"));
        assert!(store.snapshot().loading, "a failed booking does not count as a load");
    }

    #[tokio::test]
    async fn test_duplicate_check_failure_is_a_create_failure() {
        let (storage, store) = memory_store();
        storage.set_fail_selects(true);

        let result = store.try_create_appointment("2024-06-12", "Grace Hopper", "grace@example.com").await;

        assert!(matches!(result, Err(BookingError::Storage(StorageError::Unavailable(_)))));
        assert_eq!(storage.row_count_for("2024-06-12"), 0);
    }

    #[tokio::test]
    async fn test_failed_refresh_after_insert_still_succeeds() {
        struct FailingListStorage(MemoryAppointmentStorage);

        #[async_trait]
        impl AppointmentStorage for FailingListStorage {
            async fn select_dates_by_status(&self, _status: AppointmentStatus) -> Result<Vec<String>, StorageError> {
                Err(StorageError::Unavailable("list down".to_string()))
            }

            async fn select_ids_by_date(&self, date: &str, status: AppointmentStatus) -> Result<Vec<String>, StorageError> {
                self.0.select_ids_by_date(date, status).await
            }

            async fn insert_appointment(&self, appointment: &NewAppointment) -> Result<Appointment, StorageError> {
                self.0.insert_appointment(appointment).await
            }
        }

        let store = AvailabilityStore::new(Arc::new(FailingListStorage(MemoryAppointmentStorage::new())));
        let response = store.create_appointment("2024-06-12", "Grace Hopper", "grace@example.com").await;

        assert!(response.success);
        assert!(store.snapshot().error.is_some());
    }

    /// Storage whose pre-check never sees existing rows, as if a concurrent
    /// request had inserted between the check and the insert
    struct BlindPrecheck(SqliteAppointmentStorage);

    #[async_trait]
    impl AppointmentStorage for BlindPrecheck {
        async fn select_dates_by_status(&self, status: AppointmentStatus) -> Result<Vec<String>, StorageError> {
            self.0.select_dates_by_status(status).await
        }

        async fn select_ids_by_date(&self, _date: &str, _status: AppointmentStatus) -> Result<Vec<String>, StorageError> {
            Ok(Vec::new())
        }

        async fn insert_appointment(&self, appointment: &NewAppointment) -> Result<Appointment, StorageError> {
            self.0.insert_appointment(appointment).await
        }
    }

    #[tokio::test]
    async fn test_unique_index_catches_check_then_insert_race() {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let sqlite = SqliteAppointmentStorage::new(db);
        let store = AvailabilityStore::new(Arc::new(BlindPrecheck(sqlite.clone())));

        let first = store.create_appointment("2024-06-10", "Grace Hopper", "grace@example.com").await;
        let second = store.create_appointment("2024-06-10", "Alan Turing", "alan@example.com").await;

        assert!(first.success);
        assert!(!second.success);
        assert!(second.error.unwrap().contains("already booked"));
        assert_eq!(
            sqlite
                .select_ids_by_date("2024-06-10", AppointmentStatus::Scheduled)
                .await
                .unwrap()
                .len(),
            1
        );
    }

    /// Storage whose first booked-date listing reads the table, then stalls
    /// until the test releases it
    struct StalledFirstListing {
        inner: MemoryAppointmentStorage,
        listed: tokio::sync::Notify,
        release: std::sync::Mutex<Option<tokio::sync::oneshot::Receiver<()>>>,
    }

    #[async_trait]
    impl AppointmentStorage for StalledFirstListing {
        async fn select_dates_by_status(&self, status: AppointmentStatus) -> Result<Vec<String>, StorageError> {
            let result = self.inner.select_dates_by_status(status).await;
            let release = self.release.lock().unwrap().take();
            if let Some(release) = release {
                self.listed.notify_one();
                let _ = release.await;
            }
            result
        }

        async fn select_ids_by_date(&self, date: &str, status: AppointmentStatus) -> Result<Vec<String>, StorageError> {
            self.inner.select_ids_by_date(date, status).await
        }

        async fn insert_appointment(&self, appointment: &NewAppointment) -> Result<Appointment, StorageError> {
            self.inner.insert_appointment(appointment).await
        }
    }

    #[tokio::test]
    async fn test_slow_initial_load_does_not_hide_new_booking() {
        let (release_tx, release_rx) = tokio::sync::oneshot::channel();
        let storage = Arc::new(StalledFirstListing {
            inner: MemoryAppointmentStorage::new(),
            listed: tokio::sync::Notify::new(),
            release: std::sync::Mutex::new(Some(release_rx)),
        });
        let store = AvailabilityStore::new(storage.clone());

        let initial_load = tokio::spawn({
            let store = store.clone();
            async move { store.ensure_loaded().await }
        });
        storage.listed.notified().await;

        let response = store.create_appointment("2024-06-12", "Grace Hopper", "grace@example.com").await;
        assert!(response.success);
        assert!(store.snapshot().booked_dates.contains(date(2024, 6, 12)));

        release_tx.send(()).unwrap();
        initial_load.await.unwrap();

        let snapshot = store.snapshot();
        assert!(
            snapshot.booked_dates.contains(date(2024, 6, 12)),
            "the earlier, slower load must not replace the post-booking dates"
        );
        assert!(!snapshot.loading);

        // The first load has run, so the calendar window keeps this snapshot
        store.ensure_loaded().await;
        assert!(store.snapshot().booked_dates.contains(date(2024, 6, 12)));
    }

    #[tokio::test]
    async fn test_superseded_failure_is_not_recorded() {
        let (release_tx, release_rx) = tokio::sync::oneshot::channel();
        let storage = Arc::new(StalledFirstListing {
            inner: MemoryAppointmentStorage::new(),
            listed: tokio::sync::Notify::new(),
            release: std::sync::Mutex::new(Some(release_rx)),
        });
        storage.inner.set_fail_selects(true);
        let store = AvailabilityStore::new(storage.clone());

        let slow_load = tokio::spawn({
            let store = store.clone();
            async move { store.load_booked_dates().await.is_err() }
        });
        storage.listed.notified().await;

        storage.inner.set_fail_selects(false);
        storage.inner.seed("2024-06-10", AppointmentStatus::Scheduled);
        store.load_booked_dates().await.unwrap();

        release_tx.send(()).unwrap();
        assert!(slow_load.await.unwrap(), "the slow load still reports its own failure");

        let snapshot = store.snapshot();
        assert!(snapshot.error.is_none());
        assert!(snapshot.booked_dates.contains(date(2024, 6, 10)));
    }

    #[tokio::test]
    async fn test_closed_weekday_is_still_bookable_directly() {
        let (storage, store) = memory_store();

        // 2024-06-15 is a Saturday; the calendar never offers it
        let response = store.create_appointment("2024-06-15", "Grace Hopper", "grace@example.com").await;

        assert!(response.success);
        assert_eq!(storage.row_count_for("2024-06-15"), 1);
    }
}
