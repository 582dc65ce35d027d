use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use shared::dates::parse_canonical_date;
use shared::{CalendarWindow, CreateAppointmentRequest, CreateAppointmentResponse, LogRequest, LogResponse};
use tracing::{debug, error, info, warn};

use crate::domain::{AvailabilityStore, BookingError};

/// Application state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub availability: AvailabilityStore,
    today: fn() -> NaiveDate,
}

impl AppState {
    pub fn new(availability: AvailabilityStore) -> Self {
        Self {
            availability,
            today: local_today,
        }
    }

    /// Replace the clock used to anchor the calendar window
    pub fn with_today(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn today(&self) -> NaiveDate {
        (self.today)()
    }
}

fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Query parameters for the calendar window endpoint
#[derive(Deserialize, Debug)]
pub struct CalendarWindowQuery {
    /// Currently selected date, `YYYY-MM-DD`
    pub selected: Option<String>,
}

/// Axum handler function for GET /api/appointments/booked-dates
pub async fn get_booked_dates(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/appointments/booked-dates");

    match state.availability.load_booked_dates().await {
        Ok(_) => (StatusCode::OK, Json(state.availability.snapshot())).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.user_message()).into_response(),
    }
}

/// Axum handler function for POST /api/appointments
pub async fn create_appointment(
    State(state): State<AppState>,
    Json(request): Json<CreateAppointmentRequest>,
) -> impl IntoResponse {
    info!("POST /api/appointments - date: {}", request.appointment_date);

    match state
        .availability
        .try_create_appointment(&request.appointment_date, &request.client_name, &request.client_email)
        .await
    {
        Ok(_) => (StatusCode::CREATED, Json(CreateAppointmentResponse::succeeded())).into_response(),
        Err(e) => {
            let status = match &e {
                BookingError::DateAlreadyBooked => StatusCode::CONFLICT,
                BookingError::InvalidDate(_) | BookingError::InvalidClient(_) => StatusCode::BAD_REQUEST,
                BookingError::Fetch(_) | BookingError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            warn!("Booking rejected with {}: {}", status, e);
            (status, Json(CreateAppointmentResponse::failed(e.user_message()))).into_response()
        }
    }
}

/// Axum handler function for GET /api/calendar/window
pub async fn get_calendar_window(
    State(state): State<AppState>,
    Query(query): Query<CalendarWindowQuery>,
) -> impl IntoResponse {
    info!("GET /api/calendar/window - query: {:?}", query);

    let selected = match query.selected.as_deref() {
        None => None,
        Some(raw) => match parse_canonical_date(raw) {
            Some(date) => Some(date),
            None => return (StatusCode::BAD_REQUEST, format!("Invalid selected date: {}", raw)).into_response(),
        },
    };

    state.availability.ensure_loaded().await;
    let snapshot = state.availability.snapshot();

    let window = CalendarWindow::new(state.today(), &snapshot.booked_dates, selected);
    (StatusCode::OK, Json(window)).into_response()
}

/// Axum handler function for POST /api/logs
pub async fn log_message(Json(request): Json<LogRequest>) -> Json<LogResponse> {
    let component = request.component.as_deref().unwrap_or("frontend");

    match request.level.to_lowercase().as_str() {
        "debug" => debug!(component = component, "{}", request.message),
        "warn" => warn!(component = component, "{}", request.message),
        "error" => error!(component = component, "{}", request.message),
        _ => info!(component = component, "{}", request.message),
    }

    Json(LogResponse { success: true })
}
