// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::{DateTime, Datelike, NaiveDate, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Short per-day label shown on each blister position, e.g. `15 Jun`.
pub fn format_pill_day(date: NaiveDate) -> String {
    date.format("%-d %b").to_string()
}

/// Month/year label, e.g. `June 2025`.
pub fn format_month_year(date: NaiveDate) -> String {
    date.format("%B %Y").to_string()
}

/// Span label for a blister covering `first..=last`, e.g.
/// `June 2025 - July 2025`.
pub fn format_range_label(first: NaiveDate, last: NaiveDate) -> String {
    format!("{} - {}", format_month_year(first), format_month_year(last))
}

/// Display form of the starting date, e.g. `01.06.2025`.
pub fn format_start_date(date: NaiveDate) -> String {
    format!(
        "{:02}.{:02}.{:04}",
        date.day(),
        date.month(),
        date.year()
    )
}
