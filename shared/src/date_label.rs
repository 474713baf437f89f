//! Human-readable labels for event days.
//!
//! Dates are interpreted in UTC and rendered with fixed English name tables, so
//! the output never depends on the host locale or timezone.

use chrono::{DateTime, Datelike, NaiveDate, Utc};

/// Label stored when a date cannot be parsed.
pub const INVALID_DATE: &str = "Invalid date";

const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Format an ISO date like `2025-11-02` as `Sunday, Nov. 2nd`.
///
/// Accepts a bare calendar date or an RFC 3339 date-time, which is converted to
/// UTC first. Anything else yields [`INVALID_DATE`].
pub fn format_date_label(date: &str) -> String {
    match parse_date(date) {
        Some(date) => label_for(date),
        None => INVALID_DATE.to_string(),
    }
}

/// English ordinal suffix for a day of the month.
pub fn ordinal_suffix(day: u32) -> &'static str {
    if (11..=13).contains(&(day % 100)) {
        return "th";
    }
    match day % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc).date_naive())
}

fn label_for(date: NaiveDate) -> String {
    let weekday = WEEKDAYS[date.weekday().num_days_from_monday() as usize];
    let month = MONTHS[date.month0() as usize];
    let day = date.day();
    format!("{weekday}, {month}. {day}{}", ordinal_suffix(day))
}
