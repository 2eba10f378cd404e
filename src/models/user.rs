//! User account and notification records.

use serde::{Deserialize, Serialize};

/// User account stored in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Opaque user ID (also used as document ID)
    pub uid: String,
    /// Email address used for login and password reset
    pub email: String,
    /// Argon2id PHC hash of the password
    pub password_hash: String,
    /// When the account was created (RFC3339)
    pub created_at: String,
}

/// A reminder notification recorded for delivery.
///
/// Actual delivery (push, mail) is handled outside this service; we record
/// the notification and log it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Notification ID (also used as document ID)
    pub id: String,
    pub user_id: String,
    /// Channel the notification belongs to
    pub channel: String,
    pub title: String,
    pub body: String,
    pub created_at: String,
}

/// A notification channel, created once before first use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationChannel {
    /// Channel ID (also used as document ID)
    pub id: String,
    pub description: String,
}

/// Time-limited token backing password reset by email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordResetToken {
    /// Opaque token (also used as document ID)
    pub token: String,
    pub uid: String,
    /// Expiry instant (RFC3339); tokens past this are rejected
    pub expires_at: String,
}
