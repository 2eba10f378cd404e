// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Reminder scheduling glue.
//!
//! Both reminders are pure functions of persisted state plus wall-clock
//! time; this module computes the fire instant and hands it to Cloud
//! Tasks. Scheduling failures are logged and skipped for that attempt;
//! the next settings change or refresh retries naturally.

use std::sync::Arc;

use chrono::{DateTime, Days, Duration, Local, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;

use crate::db::PillStore;
use crate::error::AppError;
use crate::models::settings::PillTime;
use crate::models::BlisterConfig;
use crate::services::tasks::{SendBlisterReminderPayload, SendPillReminderPayload, TasksService};

/// The blister-end reminder always fires at 14:00 local time.
pub const BLISTER_REMINDER_HOUR: u32 = 14;

/// Next occurrence of `time` relative to `now`: today if the instant has
/// not yet passed, otherwise tomorrow.
pub fn next_daily_occurrence(now: NaiveDateTime, time: PillTime) -> Option<NaiveDateTime> {
    let candidate = now.date().and_time(time.to_naive_time()?);
    if candidate < now {
        Some(candidate + Duration::days(1))
    } else {
        Some(candidate)
    }
}

/// Instant of the blister-end reminder: 7 days before the blister's last
/// day (inclusive counting, i.e. last day minus 6), at 14:00 local.
pub fn blister_end_reminder_at(config: &BlisterConfig) -> Option<NaiveDateTime> {
    let reminder_date = config.last_day().checked_sub_days(Days::new(6))?;
    reminder_date.and_hms_opt(BLISTER_REMINDER_HOUR, 0, 0)
}

/// Resolve a local wall-clock instant to UTC for the task queue.
fn local_to_utc(naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// What happened to a blister-end scheduling attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleOutcome {
    /// A new reminder task was queued.
    Scheduled,
    /// A task for this reminder date is already queued; nothing to do.
    AlreadyScheduled,
    /// The reminder instant is already in the past; silently skipped.
    InPast,
    /// The shopping-reminder switch is off.
    Disabled,
    /// Pill count or first pill date is missing.
    NotConfigured,
    /// The task queue rejected the request; skipped for this attempt.
    Failed,
}

/// Schedules reminder callbacks from persisted preferences.
#[derive(Clone)]
pub struct ReminderScheduler {
    store: Arc<dyn PillStore>,
    tasks: Arc<TasksService>,
}

impl ReminderScheduler {
    pub fn new(store: Arc<dyn PillStore>, tasks: Arc<TasksService>) -> Self {
        Self { store, tasks }
    }

    /// Arm the daily pill reminder from the persisted reminder time.
    ///
    /// Returns the local fire instant, or `None` when no reminder time is
    /// stored or the task could not be queued.
    pub async fn arm_daily_reminder(
        &self,
        uid: &str,
        service_url: &str,
        now: NaiveDateTime,
    ) -> Result<Option<NaiveDateTime>, AppError> {
        let Some(time) = self.store.get_pill_time(uid).await? else {
            tracing::debug!(uid, "No reminder time stored, not arming daily reminder");
            return Ok(None);
        };

        let Some(fire_at) = next_daily_occurrence(now, time) else {
            return Ok(None);
        };
        let Some(fire_at_utc) = local_to_utc(fire_at) else {
            tracing::warn!(uid, %fire_at, "Fire instant not representable in local time, skipping");
            return Ok(None);
        };

        let payload = SendPillReminderPayload {
            user_id: uid.to_string(),
        };

        match self
            .tasks
            .queue_pill_reminder(service_url, payload, fire_at_utc)
            .await
        {
            Ok(()) => {
                tracing::info!(uid, %fire_at, "Daily pill reminder armed");
                Ok(Some(fire_at))
            }
            Err(e) => {
                tracing::warn!(uid, error = %e, "Failed to arm daily pill reminder, skipping");
                Ok(None)
            }
        }
    }

    /// Re-arm the daily reminder after a callback fired.
    ///
    /// Nudges `now` past the instant that just fired so the next
    /// occurrence lands on tomorrow instead of re-firing immediately.
    pub async fn rearm_daily_reminder(
        &self,
        uid: &str,
        service_url: &str,
        now: NaiveDateTime,
    ) -> Result<Option<NaiveDateTime>, AppError> {
        self.arm_daily_reminder(uid, service_url, now + Duration::minutes(1))
            .await
    }

    /// Schedule the one-shot blister-end reminder if all conditions hold:
    /// switch enabled, blister configured, instant still in the future,
    /// and not already scheduled for this reminder date.
    pub async fn schedule_blister_end(
        &self,
        uid: &str,
        service_url: &str,
        now: NaiveDateTime,
    ) -> Result<ScheduleOutcome, AppError> {
        if self.store.get_reminder_switch(uid).await? != Some(true) {
            return Ok(ScheduleOutcome::Disabled);
        }

        let count = self.store.get_pill_count(uid).await?;
        let first = self.store.get_first_pill_date(uid).await?;
        let (Some(pill_count), Some(first_pill_date)) = (count, first) else {
            return Ok(ScheduleOutcome::NotConfigured);
        };

        let config = BlisterConfig::new(first_pill_date, pill_count);
        let Some(fire_at) = blister_end_reminder_at(&config) else {
            tracing::warn!(uid, "Blister range not representable, skipping reminder");
            return Ok(ScheduleOutcome::NotConfigured);
        };
        let reminder_date = fire_at.date();

        if self.store.get_scheduled_blister_reminder(uid).await? == Some(reminder_date) {
            return Ok(ScheduleOutcome::AlreadyScheduled);
        }

        if fire_at < now {
            tracing::debug!(uid, %fire_at, "Blister-end reminder instant already passed");
            return Ok(ScheduleOutcome::InPast);
        }

        let Some(fire_at_utc) = local_to_utc(fire_at) else {
            tracing::warn!(uid, %fire_at, "Fire instant not representable in local time, skipping");
            return Ok(ScheduleOutcome::Failed);
        };

        let payload = SendBlisterReminderPayload {
            user_id: uid.to_string(),
            reminder_date: reminder_date.format("%Y-%m-%d").to_string(),
        };

        match self
            .tasks
            .queue_blister_reminder(service_url, payload, fire_at_utc)
            .await
        {
            Ok(()) => {
                self.store
                    .set_scheduled_blister_reminder(uid, reminder_date)
                    .await?;
                tracing::info!(uid, %reminder_date, "Blister-end reminder scheduled");
                Ok(ScheduleOutcome::Scheduled)
            }
            Err(e) => {
                tracing::warn!(uid, error = %e, "Failed to schedule blister-end reminder, skipping");
                Ok(ScheduleOutcome::Failed)
            }
        }
    }
}
