//! Booking window projection.
//!
//! Everything here is a pure function of `(today, booked dates, selected date)`
//! so the same grid can be computed by the server and by the browser.

use std::collections::btree_set;
use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::dates::{month_name, weekday_short_name};

/// Number of days shown, starting with today
pub const BOOKING_WINDOW_DAYS: usize = 30;

/// Dates that already have a scheduled appointment.
///
/// Rebuilt wholesale on every fetch and never mutated in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookedDateSet(BTreeSet<NaiveDate>);

impl BookedDateSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.0.contains(&date)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Booked dates in ascending order
    pub fn iter(&self) -> btree_set::Iter<'_, NaiveDate> {
        self.0.iter()
    }
}

impl FromIterator<NaiveDate> for BookedDateSet {
    fn from_iter<I: IntoIterator<Item = NaiveDate>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Monday through Thursday accept appointments
pub fn is_bookable_weekday(weekday: Weekday) -> bool {
    matches!(weekday, Weekday::Mon | Weekday::Tue | Weekday::Wed | Weekday::Thu)
}

/// Friday through Sunday are greyed out regardless of bookings
pub fn is_closed_weekday(weekday: Weekday) -> bool {
    matches!(weekday, Weekday::Fri | Weekday::Sat | Weekday::Sun)
}

/// The contiguous window `today + 0 ..= today + 29`, ascending
pub fn booking_window(today: NaiveDate) -> Vec<NaiveDate> {
    today.iter_days().take(BOOKING_WINDOW_DAYS).collect()
}

/// One cell of the booking grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub is_booked: bool,
    /// Bookable weekday and not booked
    pub is_selectable: bool,
    pub is_closed_weekday: bool,
    pub is_selected: bool,
}

impl CalendarDay {
    pub fn new(date: NaiveDate, booked: &BookedDateSet, selected: Option<NaiveDate>) -> Self {
        let weekday = date.weekday();
        let is_booked = booked.contains(date);

        Self {
            date,
            is_booked,
            is_selectable: is_bookable_weekday(weekday) && !is_booked,
            is_closed_weekday: is_closed_weekday(weekday),
            is_selected: selected == Some(date),
        }
    }

    /// Day of month shown in the cell
    pub fn day_number(&self) -> u32 {
        self.date.day()
    }

    /// Whether the "booked" dot is drawn.
    ///
    /// Closed weekdays were never selectable, so a stray booking on one is not
    /// advertised as taken.
    pub fn shows_booked_marker(&self) -> bool {
        self.is_booked && !self.is_closed_weekday
    }
}

/// Click guard: the date to report upward, or `None` when the day cannot be picked
pub fn select_day(day: &CalendarDay) -> Option<NaiveDate> {
    day.is_selectable.then_some(day.date)
}

/// Compute every cell of the window
pub fn build_calendar_days(
    today: NaiveDate,
    booked: &BookedDateSet,
    selected: Option<NaiveDate>,
) -> Vec<CalendarDay> {
    booking_window(today)
        .into_iter()
        .map(|date| CalendarDay::new(date, booked, selected))
        .collect()
}

/// Everything the booking grid needs to render
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarWindow {
    pub today: NaiveDate,
    /// e.g. "June 2024"
    pub month_label: String,
    /// Short names of the first seven window days, in window order
    pub weekday_labels: Vec<String>,
    pub days: Vec<CalendarDay>,
}

impl CalendarWindow {
    pub fn new(today: NaiveDate, booked: &BookedDateSet, selected: Option<NaiveDate>) -> Self {
        let days = build_calendar_days(today, booked, selected);
        let weekday_labels = days
            .iter()
            .take(7)
            .map(|day| weekday_short_name(day.date.weekday()).to_string())
            .collect();

        Self {
            today,
            month_label: format!("{} {}", month_name(today.month()), today.year()),
            weekday_labels,
            days,
        }
    }
}
