use chrono::NaiveDate;
use yew::prelude::*;

mod components;
mod hooks;
mod services;

use components::booking_form::BookingForm;
use components::calendar::Calendar;
use hooks::use_appointments::{use_appointments, NewBooking};
use services::api::ApiClient;

#[function_component(App)]
fn app() -> Html {
    let api_client = use_state(ApiClient::new);
    let appointments = use_appointments(&api_client);
    let selected_date = use_state(|| Option::<NaiveDate>::None);

    let on_date_select = {
        let selected_date = selected_date.clone();
        Callback::from(move |date: NaiveDate| {
            selected_date.set(Some(date));
        })
    };

    let on_submit = {
        let selected_date = selected_date.clone();
        let create_appointment = appointments.actions.create_appointment.clone();
        Callback::from(move |(client_name, client_email): (String, String)| {
            if let Some(date) = *selected_date {
                create_appointment.emit(NewBooking {
                    date,
                    client_name,
                    client_email,
                });
            }
        })
    };

    // A booked day is no longer selectable
    {
        let selected_date = selected_date.clone();
        use_effect_with(appointments.state.last_result.clone(), move |last_result| {
            if last_result.as_ref().is_some_and(|result| result.success) {
                selected_date.set(None);
            }
            || ()
        });
    }

    let on_retry = {
        let refresh = appointments.actions.refresh.clone();
        Callback::from(move |_: MouseEvent| refresh.emit(()))
    };

    html! {
        <main class="booking-page">
            {if let Some(error) = &appointments.state.error {
                html! {
                    <div class="load-error">
                        {error.clone()}
                        <button onclick={on_retry}>{"Retry"}</button>
                    </div>
                }
            } else {
                html! {}
            }}
            <Calendar
                selected_date={*selected_date}
                on_date_select={on_date_select}
                booked_dates={appointments.state.booked_dates.clone()}
                loading={appointments.state.loading}
            />
            <BookingForm
                selected_date={*selected_date}
                creating={appointments.state.creating}
                last_result={appointments.state.last_result.clone()}
                on_submit={on_submit}
            />
        </main>
    }
}

fn main() {
    yew::Renderer::<App>::new().render();
}
