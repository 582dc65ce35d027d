//! Canonical calendar-day strings.
//!
//! Appointment dates travel as `YYYY-MM-DD`. Values read back from storage or
//! produced by a browser may carry a time and zone suffix; only the calendar
//! date as written is significant, so equality is always done on the parsed
//! `NaiveDate`.

use chrono::{NaiveDate, NaiveTime, Weekday};

/// Format used for every stored and transmitted appointment date.
pub const CANONICAL_DATE_FORMAT: &str = "%Y-%m-%d";

/// Format a date as `YYYY-MM-DD`
pub fn format_canonical(date: NaiveDate) -> String {
    date.format(CANONICAL_DATE_FORMAT).to_string()
}

/// Parse a canonical date, ignoring any trailing time-of-day component.
///
/// Accepts `2024-06-10`, `2024-06-10T15:00:00Z`, `2024-06-10T23:30:00-04:00`
/// and `2024-06-10 09:00:00`. The zone is never applied: `2024-06-10T23:30:00-04:00`
/// is June 10th, not June 11th.
pub fn parse_canonical_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    let date_part = value.get(..10)?;
    let rest = &value[10..];

    if !rest.is_empty() {
        let time = rest.strip_prefix('T').or_else(|| rest.strip_prefix(' '))?;
        if !is_time_of_day(time) {
            return None;
        }
    }

    NaiveDate::parse_from_str(date_part, CANONICAL_DATE_FORMAT).ok()
}

/// `HH:MM[:SS[.fff]]` with an optional `Z` or `±HH[:MM]` offset
fn is_time_of_day(value: &str) -> bool {
    let (time, offset) = split_offset(value);
    let time = time.trim_end();

    let time_ok = NaiveTime::parse_from_str(time, "%H:%M:%S%.f").is_ok()
        || NaiveTime::parse_from_str(time, "%H:%M").is_ok();

    time_ok && is_utc_offset(offset)
}

fn split_offset(value: &str) -> (&str, &str) {
    if let Some(time) = value.strip_suffix('Z') {
        return (time, "");
    }
    match value.rfind(['+', '-']) {
        Some(index) => value.split_at(index),
        None => (value, ""),
    }
}

fn is_utc_offset(offset: &str) -> bool {
    let Some(digits) = offset.get(1..) else {
        return true;
    };
    let digits: Vec<char> = digits.chars().filter(|c| *c != ':').collect();
    matches!(digits.len(), 2 | 4) && digits.iter().all(|c| c.is_ascii_digit())
}

/// Get month name from number (1-12)
pub fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January", 2 => "February", 3 => "March", 4 => "April",
        5 => "May", 6 => "June", 7 => "July", 8 => "August",
        9 => "September", 10 => "October", 11 => "November", 12 => "December",
        _ => "Unknown",
    }
}

/// Three-letter weekday label used in the calendar header row
pub fn weekday_short_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
        Weekday::Sun => "Sun",
    }
}
