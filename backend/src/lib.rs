//! # Appointment Booking Backend
//!
//! Serves the availability data behind the booking calendar.
//!
//! ## Architecture
//!
//! ```text
//! UI Layer (Yew frontend)
//!     ↓
//! IO Layer (REST handlers in `rest`)
//!     ↓
//! Domain Layer (`AvailabilityStore`)
//!     ↓
//! Storage Layer (`AppointmentStorage`, SQLite)
//! ```
//!
//! The storage client is constructed once in [`initialize_backend`] and
//! injected into the domain layer; nothing holds it in a global.

pub mod config;
pub mod db;
pub mod domain;
pub mod rest;
pub mod storage;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::config::AppConfig;
use crate::db::DbConnection;
use crate::domain::AvailabilityStore;
use crate::rest::AppState;
use crate::storage::SqliteAppointmentStorage;

/// Open the database and wire the services together
pub async fn initialize_backend(config: &AppConfig) -> Result<AppState> {
    info!("Setting up database");
    let db_conn = DbConnection::new(&config.database_url)
        .await
        .with_context(|| format!("Failed to open database {}", config.database_url))?;

    info!("Setting up availability store");
    let storage = Arc::new(SqliteAppointmentStorage::new(db_conn));
    let availability = AvailabilityStore::new(storage);

    Ok(AppState::new(availability))
}

/// Create the Axum router with all API routes configured
pub fn create_router(app_state: AppState, allowed_origin: &str) -> Result<Router> {
    // CORS setup to allow frontend to make requests
    let cors = CorsLayer::new()
        .allow_origin(
            allowed_origin
                .parse::<HeaderValue>()
                .with_context(|| format!("Invalid CORS origin: {}", allowed_origin))?,
        )
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/appointments", post(rest::create_appointment))
        .route("/appointments/booked-dates", get(rest::get_booked_dates))
        .route("/calendar/window", get(rest::get_calendar_window))
        .route("/logs", post(rest::log_message));

    Ok(Router::new()
        .nest("/api", api_routes)
        .layer(cors)
        .with_state(app_state))
}
