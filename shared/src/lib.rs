use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use chrono::NaiveDate;

pub mod calendar;
pub mod dates;
pub mod generation;

pub use calendar::{BookedDateSet, CalendarDay, CalendarWindow};
pub use generation::LoadGeneration;

/// Lifecycle state of an appointment row.
///
/// Only `Scheduled` rows occupy a date. Transitions to the terminal states are
/// made outside this application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    /// Text stored in the `status` column
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(AppointmentStatus::Scheduled),
            "completed" => Ok(AppointmentStatus::Completed),
            "cancelled" => Ok(AppointmentStatus::Cancelled),
            other => Err(format!("Unknown appointment status: {}", other)),
        }
    }
}

/// A row of the appointments table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    /// Calendar date, no time component
    pub appointment_date: NaiveDate,
    pub client_name: String,
    pub client_email: String,
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateAppointmentRequest {
    /// `YYYY-MM-DD`; a trailing time component is tolerated and discarded
    pub appointment_date: String,
    pub client_name: String,
    pub client_email: String,
}

/// Outcome of a booking attempt: `{success: true}` or `{success: false, error}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateAppointmentResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CreateAppointmentResponse {
    pub fn succeeded() -> Self {
        Self { success: true, error: None }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
        }
    }
}

/// Reactive view of the availability store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilitySnapshot {
    pub booked_dates: BookedDateSet,
    pub loading: bool,
    pub error: Option<String>,
}

impl AvailabilitySnapshot {
    /// State before the first fetch has completed
    pub fn initial() -> Self {
        Self {
            booked_dates: BookedDateSet::new(),
            loading: true,
            error: None,
        }
    }
}

/// Log line forwarded from the browser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRequest {
    pub level: String,
    pub message: String,
    pub component: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogResponse {
    pub success: bool,
}
