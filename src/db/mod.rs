//! Database layer (Firestore, plus an in-memory fake for tests).

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::AppError;
use crate::models::settings::PillTime;
use crate::models::{Notification, NotificationChannel, PasswordResetToken, User};

/// Collection names as constants.
///
/// The per-user preference collections mirror the key paths of the
/// original data layout: one document per user, keyed by uid. Pill states
/// are one document per `(uid, date)` pair.
pub mod collections {
    pub const USERS: &str = "users";
    pub const PILL_NUMBER: &str = "pillNumber";
    pub const FIRST_PILL_DATE: &str = "firstPillDate";
    pub const PILL_STATES: &str = "pillStates";
    /// Raw text mirror of the pill-count input field
    pub const PILL_TYPE: &str = "pillType";
    pub const PILL_TIME: &str = "pillTime";
    pub const REMINDER_SWITCH: &str = "reminderSwitch";
    /// Persisted blister-end scheduling marker (keyed by uid)
    pub const SCHEDULED_REMINDERS: &str = "scheduledReminders";
    pub const NOTIFICATIONS: &str = "notifications";
    pub const NOTIFICATION_CHANNELS: &str = "notificationChannels";
    pub const RESET_TOKENS: &str = "resetTokens";
}

/// Storage operations used by the services.
///
/// Every component receives this as an injected dependency instead of
/// reaching for a global client, so tests substitute [`MemoryStore`].
/// Each key is independently readable and writable; the store gives no
/// ordering or atomicity guarantee across keys (last write wins per key).
#[async_trait]
pub trait PillStore: Send + Sync {
    // ─── Users ───────────────────────────────────────────────────

    async fn get_user(&self, uid: &str) -> Result<Option<User>, AppError>;

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn upsert_user(&self, user: &User) -> Result<(), AppError>;

    // ─── Blister Configuration ───────────────────────────────────

    async fn get_pill_count(&self, uid: &str) -> Result<Option<u32>, AppError>;

    async fn set_pill_count(&self, uid: &str, count: u32) -> Result<(), AppError>;

    async fn get_first_pill_date(&self, uid: &str) -> Result<Option<NaiveDate>, AppError>;

    async fn set_first_pill_date(&self, uid: &str, date: NaiveDate) -> Result<(), AppError>;

    /// Mirror of the raw pill-count input text, persisted verbatim on
    /// every submission whether or not it validates.
    async fn set_pill_type_raw(&self, uid: &str, raw: &str) -> Result<(), AppError>;

    // ─── Pill States ─────────────────────────────────────────────

    async fn get_pill_state(&self, uid: &str, date: NaiveDate) -> Result<Option<bool>, AppError>;

    async fn set_pill_state(&self, uid: &str, date: NaiveDate, taken: bool)
        -> Result<(), AppError>;

    // ─── Reminder Preferences ────────────────────────────────────

    async fn get_pill_time(&self, uid: &str) -> Result<Option<PillTime>, AppError>;

    async fn set_pill_time(&self, uid: &str, time: PillTime) -> Result<(), AppError>;

    async fn get_reminder_switch(&self, uid: &str) -> Result<Option<bool>, AppError>;

    async fn set_reminder_switch(&self, uid: &str, enabled: bool) -> Result<(), AppError>;

    /// Blister-end reminder date already handed to the scheduler for this
    /// user, if any. Persisted so a process restart cannot double-schedule.
    async fn get_scheduled_blister_reminder(
        &self,
        uid: &str,
    ) -> Result<Option<NaiveDate>, AppError>;

    async fn set_scheduled_blister_reminder(
        &self,
        uid: &str,
        date: NaiveDate,
    ) -> Result<(), AppError>;

    // ─── Notifications ───────────────────────────────────────────

    async fn channel_exists(&self, id: &str) -> Result<bool, AppError>;

    async fn put_channel(&self, channel: &NotificationChannel) -> Result<(), AppError>;

    async fn add_notification(&self, notification: &Notification) -> Result<(), AppError>;

    // ─── Password Reset ──────────────────────────────────────────

    async fn put_reset_token(&self, token: &PasswordResetToken) -> Result<(), AppError>;

    async fn get_reset_token(&self, token: &str)
        -> Result<Option<PasswordResetToken>, AppError>;

    async fn delete_reset_token(&self, token: &str) -> Result<(), AppError>;
}
