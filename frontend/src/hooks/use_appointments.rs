use chrono::NaiveDate;
use shared::dates::format_canonical;
use shared::{BookedDateSet, CreateAppointmentRequest, CreateAppointmentResponse, LoadGeneration};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::services::api::ApiClient;
use crate::services::logging::Logger;

const FETCH_FALLBACK_MESSAGE: &str = "An error occurred while loading appointments";
const CREATE_FALLBACK_MESSAGE: &str = "An error occurred while creating the appointment";

#[derive(Clone, PartialEq)]
pub struct AppointmentsState {
    pub booked_dates: BookedDateSet,
    pub loading: bool,
    pub error: Option<String>,
    pub creating: bool,
    /// Outcome of the most recent booking attempt
    pub last_result: Option<CreateAppointmentResponse>,
}

/// Booking submitted from the page
#[derive(Clone, Debug, PartialEq)]
pub struct NewBooking {
    pub date: NaiveDate,
    pub client_name: String,
    pub client_email: String,
}

pub struct UseAppointmentsResult {
    pub state: AppointmentsState,
    pub actions: UseAppointmentsActions,
}

#[derive(Clone)]
pub struct UseAppointmentsActions {
    pub refresh: Callback<()>,
    pub create_appointment: Callback<NewBooking>,
}

fn or_fallback(message: String, fallback: &str) -> String {
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}

/// Fetch booked dates and publish them. A failed fetch keeps the previous
/// dates and records the error; loading ends either way. Nothing is published
/// if another fetch started while this one was in flight.
async fn load_booked_dates(
    api_client: &ApiClient,
    generation: &LoadGeneration,
    booked_dates: &UseStateHandle<BookedDateSet>,
    loading: &UseStateHandle<bool>,
    error: &UseStateHandle<Option<String>>,
) {
    let ticket = generation.begin();
    let result = api_client.get_booked_dates().await;

    if !generation.is_current(ticket) {
        gloo::console::debug!("Discarding superseded booked-dates fetch");
        return;
    }

    match result {
        Ok(snapshot) => {
            booked_dates.set(snapshot.booked_dates);
            error.set(None);
        }
        Err(message) => {
            gloo::console::error!("Failed to fetch booked dates:", message.clone());
            Logger::error_with_component("use_appointments", &message);
            error.set(Some(or_fallback(message, FETCH_FALLBACK_MESSAGE)));
        }
    }

    loading.set(false);
}

#[hook]
pub fn use_appointments(api_client: &ApiClient) -> UseAppointmentsResult {
    let booked_dates = use_state(BookedDateSet::new);
    let loading = use_state(|| true);
    let error = use_state(|| Option::<String>::None);
    let creating = use_state(|| false);
    let last_result = use_state(|| Option::<CreateAppointmentResponse>::None);
    let generation = use_memo((), |_| LoadGeneration::new());

    let refresh = {
        let api_client = api_client.clone();
        let generation = generation.clone();
        let booked_dates = booked_dates.clone();
        let loading = loading.clone();
        let error = error.clone();

        use_callback((), move |_, _| {
            let api_client = api_client.clone();
            let generation = generation.clone();
            let booked_dates = booked_dates.clone();
            let loading = loading.clone();
            let error = error.clone();

            spawn_local(async move {
                load_booked_dates(&api_client, &generation, &booked_dates, &loading, &error).await;
            });
        })
    };

    let create_appointment = {
        let api_client = api_client.clone();
        let generation = generation.clone();
        let booked_dates = booked_dates.clone();
        let loading = loading.clone();
        let error = error.clone();
        let creating = creating.clone();
        let last_result = last_result.clone();

        use_callback((), move |booking: NewBooking, _| {
            let api_client = api_client.clone();
            let generation = generation.clone();
            let booked_dates = booked_dates.clone();
            let loading = loading.clone();
            let error = error.clone();
            let creating = creating.clone();
            let last_result = last_result.clone();

            spawn_local(async move {
                creating.set(true);
                last_result.set(None);

                let request = CreateAppointmentRequest {
                    appointment_date: format_canonical(booking.date),
                    client_name: booking.client_name,
                    client_email: booking.client_email,
                };

                let result = match api_client.create_appointment(&request).await {
                    Ok(response) => response,
                    Err(message) => {
                        gloo::console::error!("Failed to create appointment:", message.clone());
                        CreateAppointmentResponse::failed(or_fallback(message, CREATE_FALLBACK_MESSAGE))
                    }
                };

                if result.success {
                    Logger::info_with_component(
                        "use_appointments",
                        &format!("Booked {}", request.appointment_date),
                    );
                    // Publish success only once the new date is visible
                    load_booked_dates(&api_client, &generation, &booked_dates, &loading, &error).await;
                } else if let Some(message) = &result.error {
                    Logger::warn_with_component("use_appointments", message);
                }

                last_result.set(Some(result));
                creating.set(false);
            });
        })
    };

    // Initial load on mount
    use_effect_with((), {
        let refresh = refresh.clone();
        move |_| {
            refresh.emit(());
            || ()
        }
    });

    let state = AppointmentsState {
        booked_dates: (*booked_dates).clone(),
        loading: *loading,
        error: (*error).clone(),
        creating: *creating,
        last_result: (*last_result).clone(),
    };

    let actions = UseAppointmentsActions {
        refresh,
        create_appointment,
    };

    UseAppointmentsResult { state, actions }
}
