use chrono::NaiveDate;
use shared::CreateAppointmentResponse;
use web_sys::HtmlInputElement;
use yew::prelude::*;

use crate::services::date_utils::format_date_for_display;

#[derive(Properties, PartialEq)]
pub struct BookingFormProps {
    pub selected_date: Option<NaiveDate>,
    pub creating: bool,
    pub last_result: Option<CreateAppointmentResponse>,
    /// Emits `(client_name, client_email)`
    pub on_submit: Callback<(String, String)>,
}

#[function_component(BookingForm)]
pub fn booking_form(props: &BookingFormProps) -> Html {
    let client_name = use_state(String::new);
    let client_email = use_state(String::new);

    let on_name_change = {
        let client_name = client_name.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            client_name.set(input.value());
        })
    };

    let on_email_change = {
        let client_email = client_email.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            client_email.set(input.value());
        })
    };

    let onsubmit = {
        let client_name = client_name.clone();
        let client_email = client_email.clone();
        let on_submit = props.on_submit.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            on_submit.emit(((*client_name).clone(), (*client_email).clone()));
        })
    };

    let selected_label = match props.selected_date {
        Some(date) => format_date_for_display(date),
        None => "Pick a day in the calendar".to_string(),
    };
    let can_submit = props.selected_date.is_some() && !props.creating;

    html! {
        <form class="booking-form" {onsubmit}>
            <div class="booking-form-date">{selected_label}</div>
            <input
                type="text"
                placeholder="Full name"
                value={(*client_name).clone()}
                onchange={on_name_change}
            />
            <input
                type="email"
                placeholder="Email"
                value={(*client_email).clone()}
                onchange={on_email_change}
            />
            <button type="submit" disabled={!can_submit}>
                {if props.creating { "Booking..." } else { "Book appointment" }}
            </button>
            {match &props.last_result {
                Some(result) if result.success => html! {
                    <div class="form-success">{"Your appointment is booked."}</div>
                },
                Some(result) => html! {
                    <div class="form-error">{result.error.clone().unwrap_or_default()}</div>
                },
                None => html! {},
            }}
        </form>
    }
}
