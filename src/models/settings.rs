// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Settings field validation.
//!
//! The four preference fields are independent; each has its own confirm
//! action and its own persistence key. The error strings here are shown
//! verbatim next to the input field, so their wording is part of the API.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const PILL_COUNT_ERROR: &str = "Pill count must be greater than 0";
pub const DATE_FORMAT_ERROR: &str = "Invalid date format";

/// Parse a raw pill-count submission.
///
/// Accepts integers strictly greater than zero; everything else (zero,
/// negatives, non-numeric text) is rejected with the field message.
pub fn parse_pill_count(raw: &str) -> Result<u32, AppError> {
    match raw.trim().parse::<i64>() {
        Ok(n) if n > 0 && n <= u32::MAX as i64 => Ok(n as u32),
        _ => Err(AppError::Validation(PILL_COUNT_ERROR.to_string())),
    }
}

/// Parse a raw first-pill-date submission in `yyyy-MM-dd` form.
pub fn parse_first_pill_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::Validation(DATE_FORMAT_ERROR.to_string()))
}

/// Daily reminder time of day.
///
/// The original time-selection UI guarantees in-range values; the server
/// still checks because it cannot trust the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PillTime {
    pub hour: u32,
    pub minute: u32,
}

impl PillTime {
    pub fn new(hour: u32, minute: u32) -> Result<Self, AppError> {
        if hour > 23 {
            return Err(AppError::Validation("Hour must be between 0 and 23".to_string()));
        }
        if minute > 59 {
            return Err(AppError::Validation(
                "Minute must be between 0 and 59".to_string(),
            ));
        }
        Ok(Self { hour, minute })
    }

    /// Time-of-day as a `chrono` value; in-range by construction.
    pub fn to_naive_time(self) -> Option<chrono::NaiveTime> {
        chrono::NaiveTime::from_hms_opt(self.hour, self.minute, 0)
    }
}
