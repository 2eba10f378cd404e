// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! One document per user for each preference key (pill count, first pill
//! date, reminder time, reminder switch), one document per `(uid, date)`
//! pair for pill states. Document values are small maps because Firestore
//! has no bare scalars.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::db::{collections, PillStore};
use crate::error::AppError;
use crate::models::settings::PillTime;
use crate::models::{Notification, NotificationChannel, PasswordResetToken, User};

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

// ─── Document Shapes ─────────────────────────────────────────────

#[derive(Serialize, Deserialize)]
struct CountDoc {
    count: i64,
}

#[derive(Serialize, Deserialize)]
struct DateDoc {
    /// ISO `yyyy-MM-dd` string
    date: String,
}

#[derive(Serialize, Deserialize)]
struct RawTextDoc {
    value: String,
}

#[derive(Serialize, Deserialize)]
struct StateDoc {
    taken: bool,
}

#[derive(Serialize, Deserialize)]
struct TimeDoc {
    #[serde(rename = "pillHour")]
    pill_hour: u32,
    #[serde(rename = "pillMinute")]
    pill_minute: u32,
}

#[derive(Serialize, Deserialize)]
struct SwitchDoc {
    enabled: bool,
}

#[derive(Serialize, Deserialize)]
struct ScheduledDoc {
    reminder_date: String,
}

/// Document ID for a per-day pill state.
fn pill_state_doc_id(uid: &str, date: NaiveDate) -> String {
    format!("{}_{}", uid, date)
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a disconnected client; every operation returns an error.
    /// Tests that need working storage use [`crate::db::MemoryStore`].
    pub fn new_offline() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    /// Fetch a single document by ID, mapping "not found" to `None`.
    async fn get_doc<T>(&self, collection: &str, doc_id: &str) -> Result<Option<T>, AppError>
    where
        T: for<'de> Deserialize<'de> + Send,
    {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collection)
            .obj()
            .one(doc_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or overwrite a single document.
    async fn set_doc<T>(&self, collection: &str, doc_id: &str, value: &T) -> Result<(), AppError>
    where
        T: Serialize + Sync + Send + for<'de> Deserialize<'de>,
    {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collection)
            .document_id(doc_id)
            .object(value)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl PillStore for FirestoreDb {
    // ─── Users ───────────────────────────────────────────────────

    async fn get_user(&self, uid: &str) -> Result<Option<User>, AppError> {
        self.get_doc(collections::USERS, uid).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let email = email.to_string();
        let users: Vec<User> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(move |q| q.for_all([q.field("email").eq(email.clone())]))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(users.into_iter().next())
    }

    async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        self.set_doc(collections::USERS, &user.uid, user).await
    }

    // ─── Blister Configuration ───────────────────────────────────

    async fn get_pill_count(&self, uid: &str) -> Result<Option<u32>, AppError> {
        let doc: Option<CountDoc> = self.get_doc(collections::PILL_NUMBER, uid).await?;
        // Out-of-range stored values degrade to "absent" rather than erroring.
        Ok(doc.and_then(|d| u32::try_from(d.count).ok()).filter(|c| *c > 0))
    }

    async fn set_pill_count(&self, uid: &str, count: u32) -> Result<(), AppError> {
        self.set_doc(
            collections::PILL_NUMBER,
            uid,
            &CountDoc {
                count: count as i64,
            },
        )
        .await
    }

    async fn get_first_pill_date(&self, uid: &str) -> Result<Option<NaiveDate>, AppError> {
        let doc: Option<DateDoc> = self.get_doc(collections::FIRST_PILL_DATE, uid).await?;
        match doc {
            Some(d) => match NaiveDate::parse_from_str(&d.date, "%Y-%m-%d") {
                Ok(date) => Ok(Some(date)),
                Err(_) => {
                    tracing::warn!(uid, stored = %d.date, "Unparseable first pill date, treating as absent");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    async fn set_first_pill_date(&self, uid: &str, date: NaiveDate) -> Result<(), AppError> {
        self.set_doc(
            collections::FIRST_PILL_DATE,
            uid,
            &DateDoc {
                date: date.format("%Y-%m-%d").to_string(),
            },
        )
        .await
    }

    async fn set_pill_type_raw(&self, uid: &str, raw: &str) -> Result<(), AppError> {
        self.set_doc(
            collections::PILL_TYPE,
            uid,
            &RawTextDoc {
                value: raw.to_string(),
            },
        )
        .await
    }

    // ─── Pill States ─────────────────────────────────────────────

    async fn get_pill_state(&self, uid: &str, date: NaiveDate) -> Result<Option<bool>, AppError> {
        let doc: Option<StateDoc> = self
            .get_doc(collections::PILL_STATES, &pill_state_doc_id(uid, date))
            .await?;
        Ok(doc.map(|d| d.taken))
    }

    async fn set_pill_state(
        &self,
        uid: &str,
        date: NaiveDate,
        taken: bool,
    ) -> Result<(), AppError> {
        self.set_doc(
            collections::PILL_STATES,
            &pill_state_doc_id(uid, date),
            &StateDoc { taken },
        )
        .await
    }

    // ─── Reminder Preferences ────────────────────────────────────

    async fn get_pill_time(&self, uid: &str) -> Result<Option<PillTime>, AppError> {
        let doc: Option<TimeDoc> = self.get_doc(collections::PILL_TIME, uid).await?;
        match doc {
            // Out-of-range stored values degrade to "absent".
            Some(d) => Ok(PillTime::new(d.pill_hour, d.pill_minute).ok()),
            None => Ok(None),
        }
    }

    async fn set_pill_time(&self, uid: &str, time: PillTime) -> Result<(), AppError> {
        self.set_doc(
            collections::PILL_TIME,
            uid,
            &TimeDoc {
                pill_hour: time.hour,
                pill_minute: time.minute,
            },
        )
        .await
    }

    async fn get_reminder_switch(&self, uid: &str) -> Result<Option<bool>, AppError> {
        let doc: Option<SwitchDoc> = self.get_doc(collections::REMINDER_SWITCH, uid).await?;
        Ok(doc.map(|d| d.enabled))
    }

    async fn set_reminder_switch(&self, uid: &str, enabled: bool) -> Result<(), AppError> {
        self.set_doc(collections::REMINDER_SWITCH, uid, &SwitchDoc { enabled })
            .await
    }

    async fn get_scheduled_blister_reminder(
        &self,
        uid: &str,
    ) -> Result<Option<NaiveDate>, AppError> {
        let doc: Option<ScheduledDoc> =
            self.get_doc(collections::SCHEDULED_REMINDERS, uid).await?;
        Ok(doc.and_then(|d| NaiveDate::parse_from_str(&d.reminder_date, "%Y-%m-%d").ok()))
    }

    async fn set_scheduled_blister_reminder(
        &self,
        uid: &str,
        date: NaiveDate,
    ) -> Result<(), AppError> {
        self.set_doc(
            collections::SCHEDULED_REMINDERS,
            uid,
            &ScheduledDoc {
                reminder_date: date.format("%Y-%m-%d").to_string(),
            },
        )
        .await
    }

    // ─── Notifications ───────────────────────────────────────────

    async fn channel_exists(&self, id: &str) -> Result<bool, AppError> {
        let doc: Option<NotificationChannel> =
            self.get_doc(collections::NOTIFICATION_CHANNELS, id).await?;
        Ok(doc.is_some())
    }

    async fn put_channel(&self, channel: &NotificationChannel) -> Result<(), AppError> {
        self.set_doc(collections::NOTIFICATION_CHANNELS, &channel.id, channel)
            .await
    }

    async fn add_notification(&self, notification: &Notification) -> Result<(), AppError> {
        self.set_doc(collections::NOTIFICATIONS, &notification.id, notification)
            .await
    }

    // ─── Password Reset ──────────────────────────────────────────

    async fn put_reset_token(&self, token: &PasswordResetToken) -> Result<(), AppError> {
        self.set_doc(collections::RESET_TOKENS, &token.token, token)
            .await
    }

    async fn get_reset_token(
        &self,
        token: &str,
    ) -> Result<Option<PasswordResetToken>, AppError> {
        self.get_doc(collections::RESET_TOKENS, token).await
    }

    async fn delete_reset_token(&self, token: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::RESET_TOKENS)
            .document_id(token)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
