use chrono::NaiveDate;
use shared::calendar::{select_day, CalendarDay, CalendarWindow};
use shared::dates::format_canonical;
use shared::BookedDateSet;
use web_sys::MouseEvent;
use yew::prelude::*;

use crate::services::date_utils::{format_date_for_display, today};

#[derive(Properties, PartialEq)]
pub struct CalendarProps {
    /// Date currently picked by the caller, if any
    pub selected_date: Option<NaiveDate>,
    /// Emitted only for selectable days
    pub on_date_select: Callback<NaiveDate>,
    pub booked_dates: BookedDateSet,
    pub loading: bool,
}

#[function_component(Calendar)]
pub fn calendar(props: &CalendarProps) -> Html {
    if props.loading {
        return html! {
            <div class="booking-calendar">
                <div class="calendar-loading">
                    <p>{"Loading calendar..."}</p>
                </div>
            </div>
        };
    }

    let window = CalendarWindow::new(today(), &props.booked_dates, props.selected_date);

    html! {
        <div class="booking-calendar">
            <div class="calendar-title">
                <h2>{"Appointment Calendar"}</h2>
            </div>
            <div class="calendar-month">
                <h3>{window.month_label.clone()}</h3>
            </div>
            <div class="calendar-weekdays">
                {for window.weekday_labels.iter().map(|label| html! {
                    <div class="weekday">{label.clone()}</div>
                })}
            </div>
            <div class="calendar-grid">
                {for window.days.iter().map(|day| render_day(day, &props.on_date_select))}
            </div>
        </div>
    }
}

fn render_day(day: &CalendarDay, on_date_select: &Callback<NaiveDate>) -> Html {
    let day_class = classes!(
        "calendar-day",
        day.is_selected.then_some("selected"),
        (day.is_closed_weekday || day.is_booked).then_some("unavailable"),
        day.is_selectable.then_some("selectable"),
    );

    let title = if day.is_booked {
        format!("{} (booked)", format_date_for_display(day.date))
    } else {
        format_date_for_display(day.date)
    };

    let onclick = {
        let day = day.clone();
        let on_date_select = on_date_select.clone();
        Callback::from(move |_: MouseEvent| {
            if let Some(date) = select_day(&day) {
                on_date_select.emit(date);
            }
        })
    };

    html! {
        <button
            key={format_canonical(day.date)}
            class={day_class}
            disabled={!day.is_selectable}
            {title}
            {onclick}
        >
            {day.day_number()}
            if day.shows_booked_marker() {
                <span class="booked-marker"></span>
            }
        </button>
    }
}
