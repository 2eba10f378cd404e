// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Notification posting.
//!
//! A posted notification is recorded in the store and logged; the actual
//! delivery channel (push gateway) consumes the records out of band.
//! Channels are created once before first use and cached in-process.

use std::sync::Arc;

use dashmap::DashMap;
use uuid::Uuid;

use crate::db::PillStore;
use crate::error::AppError;
use crate::models::{Notification, NotificationChannel};
use crate::time_utils::format_utc_rfc3339;

/// Static description of a notification channel.
pub struct ChannelSpec {
    pub id: &'static str,
    pub description: &'static str,
}

/// Channel for the daily "take your pill" reminder.
pub const DAILY_PILL_CHANNEL: ChannelSpec = ChannelSpec {
    id: "pill-reminder",
    description: "Sending info to take pills",
};

/// Channel for the upcoming end-of-blister reminder.
pub const BLISTER_END_CHANNEL: ChannelSpec = ChannelSpec {
    id: "blister-end",
    description: "Reminder for upcoming end of a blister",
};

#[derive(Clone)]
pub struct NotificationService {
    store: Arc<dyn PillStore>,
    /// Channels already ensured during this process lifetime.
    ensured_channels: Arc<DashMap<&'static str, ()>>,
}

impl NotificationService {
    pub fn new(store: Arc<dyn PillStore>) -> Self {
        Self {
            store,
            ensured_channels: Arc::new(DashMap::new()),
        }
    }

    /// Post a one-shot notification to a user on the given channel.
    pub async fn post(
        &self,
        uid: &str,
        channel: &ChannelSpec,
        title: &str,
        body: &str,
    ) -> Result<Notification, AppError> {
        self.ensure_channel(channel).await?;

        let notification = Notification {
            id: Uuid::new_v4().to_string(),
            user_id: uid.to_string(),
            channel: channel.id.to_string(),
            title: title.to_string(),
            body: body.to_string(),
            created_at: format_utc_rfc3339(chrono::Utc::now()),
        };

        self.store.add_notification(&notification).await?;

        tracing::info!(
            uid,
            channel = channel.id,
            title,
            "Notification posted"
        );

        Ok(notification)
    }

    /// Create the channel document if this is its first use.
    async fn ensure_channel(&self, channel: &ChannelSpec) -> Result<(), AppError> {
        if self.ensured_channels.contains_key(channel.id) {
            return Ok(());
        }

        if !self.store.channel_exists(channel.id).await? {
            self.store
                .put_channel(&NotificationChannel {
                    id: channel.id.to_string(),
                    description: channel.description.to_string(),
                })
                .await?;
            tracing::info!(channel = channel.id, "Notification channel created");
        }

        self.ensured_channels.insert(channel.id, ());
        Ok(())
    }
}
