use async_trait::async_trait;
use shared::dates::format_canonical;
use shared::{Appointment, AppointmentStatus};
use tracing::debug;
use uuid::Uuid;

use crate::db::DbConnection;
use crate::storage::traits::{AppointmentStorage, NewAppointment, StorageError};

/// SQLite-backed appointments table
#[derive(Clone)]
pub struct SqliteAppointmentStorage {
    db: DbConnection,
}

impl SqliteAppointmentStorage {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AppointmentStorage for SqliteAppointmentStorage {
    async fn select_dates_by_status(&self, status: AppointmentStatus) -> Result<Vec<String>, StorageError> {
        let dates = sqlx::query_scalar::<_, String>(
            r#"
            SELECT appointment_date
            FROM appointments
            WHERE status = ?
            ORDER BY appointment_date ASC
            "#,
        )
        .bind(status.as_str())
        .fetch_all(self.db.pool())
        .await?;

        debug!("Selected {} {} appointment dates", dates.len(), status);
        Ok(dates)
    }

    async fn select_ids_by_date(&self, date: &str, status: AppointmentStatus) -> Result<Vec<String>, StorageError> {
        let ids = sqlx::query_scalar::<_, String>(
            r#"
            SELECT id
            FROM appointments
            WHERE appointment_date = ? AND status = ?
            "#,
        )
        .bind(date)
        .bind(status.as_str())
        .fetch_all(self.db.pool())
        .await?;

        Ok(ids)
    }

    async fn insert_appointment(&self, appointment: &NewAppointment) -> Result<Appointment, StorageError> {
        let id = Uuid::new_v4().to_string();
        let date = format_canonical(appointment.appointment_date);

        sqlx::query(
            r#"
            INSERT INTO appointments (id, appointment_date, client_name, client_email, status)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&date)
        .bind(&appointment.client_name)
        .bind(&appointment.client_email)
        .bind(appointment.status.as_str())
        .execute(self.db.pool())
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => StorageError::DuplicateDate(date.clone()),
            other => StorageError::Database(other),
        })?;

        Ok(Appointment {
            id,
            appointment_date: appointment.appointment_date,
            client_name: appointment.client_name.clone(),
            client_email: appointment.client_email.clone(),
            status: appointment.status,
        })
    }
}
