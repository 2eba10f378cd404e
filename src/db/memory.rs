// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory store used by tests and local development.
//!
//! Behaves like the Firestore wrapper (last write wins per key, no
//! cross-key atomicity) and additionally records every write path so
//! tests can assert exactly which keys an operation touched.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;

use crate::db::PillStore;
use crate::error::AppError;
use crate::models::settings::PillTime;
use crate::models::{Notification, NotificationChannel, PasswordResetToken, User};

#[derive(Default)]
pub struct MemoryStore {
    users: DashMap<String, User>,
    pill_counts: DashMap<String, u32>,
    first_pill_dates: DashMap<String, NaiveDate>,
    pill_types: DashMap<String, String>,
    pill_states: DashMap<(String, NaiveDate), bool>,
    pill_times: DashMap<String, PillTime>,
    reminder_switches: DashMap<String, bool>,
    scheduled_reminders: DashMap<String, NaiveDate>,
    channels: DashMap<String, NotificationChannel>,
    notifications: DashMap<String, Notification>,
    reset_tokens: DashMap<String, PasswordResetToken>,
    /// Paths of all writes, in order, e.g. `pillStates/u1/2025-06-04`.
    write_log: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn log_write(&self, path: String) {
        self.write_log
            .lock()
            .expect("write log mutex poisoned")
            .push(path);
    }

    /// Snapshot of every write path issued so far, in order.
    pub fn writes(&self) -> Vec<String> {
        self.write_log
            .lock()
            .expect("write log mutex poisoned")
            .clone()
    }

    /// Write paths with the given prefix, in order.
    pub fn writes_to(&self, prefix: &str) -> Vec<String> {
        self.writes()
            .into_iter()
            .filter(|p| p.starts_with(prefix))
            .collect()
    }

    /// All notifications recorded for a user, unordered.
    pub fn notifications_for(&self, uid: &str) -> Vec<Notification> {
        self.notifications
            .iter()
            .filter(|entry| entry.value().user_id == uid)
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn channel_ids(&self) -> Vec<String> {
        self.channels.iter().map(|e| e.key().clone()).collect()
    }

    pub fn reset_token_for(&self, uid: &str) -> Option<PasswordResetToken> {
        self.reset_tokens
            .iter()
            .find(|entry| entry.value().uid == uid)
            .map(|entry| entry.value().clone())
    }
}

#[async_trait]
impl PillStore for MemoryStore {
    // ─── Users ───────────────────────────────────────────────────

    async fn get_user(&self, uid: &str) -> Result<Option<User>, AppError> {
        Ok(self.users.get(uid).map(|u| u.clone()))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .iter()
            .find(|entry| entry.value().email == email)
            .map(|entry| entry.value().clone()))
    }

    async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        self.log_write(format!("users/{}", user.uid));
        self.users.insert(user.uid.clone(), user.clone());
        Ok(())
    }

    // ─── Blister Configuration ───────────────────────────────────

    async fn get_pill_count(&self, uid: &str) -> Result<Option<u32>, AppError> {
        Ok(self.pill_counts.get(uid).map(|c| *c))
    }

    async fn set_pill_count(&self, uid: &str, count: u32) -> Result<(), AppError> {
        self.log_write(format!("pillNumber/{}", uid));
        self.pill_counts.insert(uid.to_string(), count);
        Ok(())
    }

    async fn get_first_pill_date(&self, uid: &str) -> Result<Option<NaiveDate>, AppError> {
        Ok(self.first_pill_dates.get(uid).map(|d| *d))
    }

    async fn set_first_pill_date(&self, uid: &str, date: NaiveDate) -> Result<(), AppError> {
        self.log_write(format!("firstPillDate/{}", uid));
        self.first_pill_dates.insert(uid.to_string(), date);
        Ok(())
    }

    async fn set_pill_type_raw(&self, uid: &str, raw: &str) -> Result<(), AppError> {
        self.log_write(format!("pillType/{}", uid));
        self.pill_types.insert(uid.to_string(), raw.to_string());
        Ok(())
    }

    // ─── Pill States ─────────────────────────────────────────────

    async fn get_pill_state(&self, uid: &str, date: NaiveDate) -> Result<Option<bool>, AppError> {
        Ok(self
            .pill_states
            .get(&(uid.to_string(), date))
            .map(|taken| *taken))
    }

    async fn set_pill_state(
        &self,
        uid: &str,
        date: NaiveDate,
        taken: bool,
    ) -> Result<(), AppError> {
        self.log_write(format!("pillStates/{}/{}", uid, date));
        self.pill_states.insert((uid.to_string(), date), taken);
        Ok(())
    }

    // ─── Reminder Preferences ────────────────────────────────────

    async fn get_pill_time(&self, uid: &str) -> Result<Option<PillTime>, AppError> {
        Ok(self.pill_times.get(uid).map(|t| *t))
    }

    async fn set_pill_time(&self, uid: &str, time: PillTime) -> Result<(), AppError> {
        self.log_write(format!("pillTime/{}", uid));
        self.pill_times.insert(uid.to_string(), time);
        Ok(())
    }

    async fn get_reminder_switch(&self, uid: &str) -> Result<Option<bool>, AppError> {
        Ok(self.reminder_switches.get(uid).map(|e| *e))
    }

    async fn set_reminder_switch(&self, uid: &str, enabled: bool) -> Result<(), AppError> {
        self.log_write(format!("reminderSwitch/{}", uid));
        self.reminder_switches.insert(uid.to_string(), enabled);
        Ok(())
    }

    async fn get_scheduled_blister_reminder(
        &self,
        uid: &str,
    ) -> Result<Option<NaiveDate>, AppError> {
        Ok(self.scheduled_reminders.get(uid).map(|d| *d))
    }

    async fn set_scheduled_blister_reminder(
        &self,
        uid: &str,
        date: NaiveDate,
    ) -> Result<(), AppError> {
        self.log_write(format!("scheduledReminders/{}", uid));
        self.scheduled_reminders.insert(uid.to_string(), date);
        Ok(())
    }

    // ─── Notifications ───────────────────────────────────────────

    async fn channel_exists(&self, id: &str) -> Result<bool, AppError> {
        Ok(self.channels.contains_key(id))
    }

    async fn put_channel(&self, channel: &NotificationChannel) -> Result<(), AppError> {
        self.log_write(format!("notificationChannels/{}", channel.id));
        self.channels.insert(channel.id.clone(), channel.clone());
        Ok(())
    }

    async fn add_notification(&self, notification: &Notification) -> Result<(), AppError> {
        self.log_write(format!("notifications/{}", notification.id));
        self.notifications
            .insert(notification.id.clone(), notification.clone());
        Ok(())
    }

    // ─── Password Reset ──────────────────────────────────────────

    async fn put_reset_token(&self, token: &PasswordResetToken) -> Result<(), AppError> {
        self.log_write(format!("resetTokens/{}", token.token));
        self.reset_tokens
            .insert(token.token.clone(), token.clone());
        Ok(())
    }

    async fn get_reset_token(
        &self,
        token: &str,
    ) -> Result<Option<PasswordResetToken>, AppError> {
        Ok(self.reset_tokens.get(token).map(|t| t.clone()))
    }

    async fn delete_reset_token(&self, token: &str) -> Result<(), AppError> {
        self.reset_tokens.remove(token);
        Ok(())
    }
}
