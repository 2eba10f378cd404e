// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Blister state model.
//!
//! A blister is a fixed-length pack of daily doses covering the inclusive
//! date range `[first_pill_date, first_pill_date + pill_count - 1]`. Each
//! day carries a single "taken" flag with no history.

use chrono::{Days, NaiveDate};

/// Configuration of the current blister: starting date and pill count.
///
/// `pill_count` is validated to be positive at the input boundary
/// (`settings::parse_pill_count`); a constructed config is always usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlisterConfig {
    pub first_pill_date: NaiveDate,
    pub pill_count: u32,
}

impl BlisterConfig {
    pub fn new(first_pill_date: NaiveDate, pill_count: u32) -> Self {
        Self {
            first_pill_date,
            pill_count,
        }
    }

    /// Date covered by blister position `index`, or `None` when the index
    /// is outside `0..pill_count`.
    pub fn date_at(&self, index: usize) -> Option<NaiveDate> {
        if index >= self.pill_count as usize {
            return None;
        }
        self.first_pill_date.checked_add_days(Days::new(index as u64))
    }

    /// Last day of the blister (inclusive).
    pub fn last_day(&self) -> NaiveDate {
        self.first_pill_date + Days::new(self.pill_count as u64 - 1)
    }

    /// All dates in the blister, in positional order.
    pub fn dates(&self) -> Vec<NaiveDate> {
        (0..self.pill_count as u64)
            .map(|i| self.first_pill_date + Days::new(i))
            .collect()
    }
}

/// Ordered per-day taken flags for one blister.
///
/// Positions map 1:1 to `BlisterConfig::dates()`. A freshly created state
/// is the all-false placeholder used while remote reads are in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlisterState {
    flags: Vec<bool>,
}

impl BlisterState {
    /// All-false placeholder for a blister of `pill_count` positions.
    pub fn placeholder(pill_count: u32) -> Self {
        Self {
            flags: vec![false; pill_count as usize],
        }
    }

    pub fn from_flags(flags: Vec<bool>) -> Self {
        Self { flags }
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<bool> {
        self.flags.get(index).copied()
    }

    /// Record a completed remote read for one position. Out-of-range
    /// completions are ignored (the config changed under us; the caller
    /// re-loads).
    pub fn set(&mut self, index: usize, taken: bool) {
        if let Some(slot) = self.flags.get_mut(index) {
            *slot = taken;
        }
    }

    /// Flip exactly one position and return its new value, or `None` when
    /// the index is out of range. No other position changes.
    pub fn toggle(&mut self, index: usize) -> Option<bool> {
        let slot = self.flags.get_mut(index)?;
        *slot = !*slot;
        Some(*slot)
    }

    pub fn flags(&self) -> &[bool] {
        &self.flags
    }
}
