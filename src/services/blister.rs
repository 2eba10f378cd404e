// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Blister state synchronization with the remote store.
//!
//! Loading issues one read per date in the blister range with bounded
//! concurrency; completion order is unspecified and each completion fills
//! only its own position. A failed or missing read degrades that position
//! to the all-false placeholder value rather than failing the load.

use std::sync::Arc;

use chrono::NaiveDate;
use futures_util::{stream, StreamExt};
use serde::Serialize;

use crate::db::PillStore;
use crate::error::AppError;
use crate::models::{BlisterConfig, BlisterState};

const MAX_CONCURRENT_DB_OPS: usize = 50;

/// Result of toggling one blister position.
#[derive(Debug, Clone, Serialize)]
pub struct ToggleOutcome {
    pub index: usize,
    pub date: NaiveDate,
    /// New value of the flag after the flip
    pub taken: bool,
}

/// Loads and toggles per-day taken flags.
#[derive(Clone)]
pub struct BlisterService {
    store: Arc<dyn PillStore>,
}

impl BlisterService {
    pub fn new(store: Arc<dyn PillStore>) -> Self {
        Self { store }
    }

    /// Read the user's blister configuration, if both fields are present.
    ///
    /// A user who has not yet confirmed a pill count or starting date has
    /// no blister; callers render the unconfigured placeholder.
    pub async fn config_for(&self, uid: &str) -> Result<Option<BlisterConfig>, AppError> {
        let count = self.store.get_pill_count(uid).await?;
        let first = self.store.get_first_pill_date(uid).await?;

        Ok(match (count, first) {
            (Some(pill_count), Some(first_pill_date)) => {
                Some(BlisterConfig::new(first_pill_date, pill_count))
            }
            _ => None,
        })
    }

    /// Load the taken flag for every date in the blister range.
    ///
    /// Issues `pill_count` independent reads; reads may complete in any
    /// order. The returned state has exactly `pill_count` positions.
    pub async fn load(&self, uid: &str, config: &BlisterConfig) -> Result<BlisterState, AppError> {
        let mut state = BlisterState::placeholder(config.pill_count);

        let completions: Vec<(usize, bool)> = stream::iter(config.dates().into_iter().enumerate())
            .map(|(index, date)| {
                let store = Arc::clone(&self.store);
                let uid = uid.to_string();
                async move {
                    match store.get_pill_state(&uid, date).await {
                        Ok(taken) => (index, taken.unwrap_or(false)),
                        Err(e) => {
                            tracing::warn!(
                                uid = %uid,
                                %date,
                                error = %e,
                                "Failed to read pill state, leaving placeholder"
                            );
                            (index, false)
                        }
                    }
                }
            })
            .buffer_unordered(MAX_CONCURRENT_DB_OPS)
            .collect()
            .await;

        for (index, taken) in completions {
            state.set(index, taken);
        }

        Ok(state)
    }

    /// Flip the flag at `index` and persist the new value.
    ///
    /// Issues exactly one write, to the path for date
    /// `first_pill_date + index`. A write failure is surfaced to the
    /// caller; nothing is persisted in that case.
    pub async fn toggle(
        &self,
        uid: &str,
        config: &BlisterConfig,
        index: usize,
    ) -> Result<ToggleOutcome, AppError> {
        let date = config.date_at(index).ok_or_else(|| {
            AppError::BadRequest(format!(
                "Pill index {} out of range for a blister of {} pills",
                index, config.pill_count
            ))
        })?;

        let current = self.store.get_pill_state(uid, date).await?.unwrap_or(false);
        let taken = !current;

        self.store.set_pill_state(uid, date, taken).await?;

        tracing::debug!(uid, index, %date, taken, "Toggled pill state");

        Ok(ToggleOutcome { index, date, taken })
    }
}
