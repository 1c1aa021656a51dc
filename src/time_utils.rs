// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting and calendar-day normalization.

use chrono::{DateTime, Local, NaiveDate, SecondsFormat, TimeZone, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Calendar day of an instant in the given time zone.
///
/// All instants between local midnight and 23:59:59.999 map to the same day.
pub fn calendar_date_in<Tz: TimeZone>(instant: DateTime<Utc>, tz: &Tz) -> NaiveDate {
    instant.with_timezone(tz).date_naive()
}

/// Calendar day of an instant in the server's local time zone.
pub fn local_calendar_date(instant: DateTime<Utc>) -> NaiveDate {
    calendar_date_in(instant, &Local)
}

/// Parse a date query parameter.
///
/// Accepts a plain `YYYY-MM-DD` day or an RFC3339 timestamp, which is
/// normalized to its local calendar day.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| local_calendar_date(dt.with_timezone(&Utc)))
}
