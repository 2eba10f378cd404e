// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Task handler routes for Cloud Tasks callbacks.
//!
//! These endpoints are called by Cloud Tasks at the scheduled reminder
//! instants, not directly by users.

use crate::services::notifications::{BLISTER_END_CHANNEL, DAILY_PILL_CHANNEL};
use crate::services::tasks::{SendBlisterReminderPayload, SendPillReminderPayload};
use crate::AppState;
use axum::{
    extract::{Json, State},
    http::StatusCode,
    routing::post,
    Router,
};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/tasks/send-pill-reminder", post(send_pill_reminder))
        .route("/tasks/send-blister-reminder", post(send_blister_reminder))
}

/// Check that the request came through our Cloud Tasks queue.
///
/// Cloud Run strips this header from external requests, so its presence
/// guarantees internal origin; we also verify the queue name.
fn is_valid_queue(headers: &axum::http::HeaderMap) -> bool {
    headers
        .get("x-cloudtasks-queuename")
        .and_then(|h| h.to_str().ok())
        .map(|name| name == crate::config::REMINDER_QUEUE_NAME)
        .unwrap_or(false)
}

/// Deliver the daily pill reminder and re-arm tomorrow's callback.
async fn send_pill_reminder(
    State(state): State<Arc<AppState>>,
    headers: axum::http::HeaderMap,
    Json(payload): Json<SendPillReminderPayload>,
) -> StatusCode {
    if !is_valid_queue(&headers) {
        tracing::warn!(
            user_id = %payload.user_id,
            "Security Alert: Blocked unauthorized access to send_pill_reminder"
        );
        return StatusCode::FORBIDDEN;
    }

    tracing::info!(user_id = %payload.user_id, "Delivering daily pill reminder");

    if let Err(e) = state
        .notification_service
        .post(
            &payload.user_id,
            &DAILY_PILL_CHANNEL,
            "Pill Reminder",
            "Time to take your pill!",
        )
        .await
    {
        tracing::error!(user_id = %payload.user_id, error = %e, "Failed to post pill reminder");
        // Return 500 to trigger Cloud Tasks retry
        return StatusCode::INTERNAL_SERVER_ERROR;
    }

    // Daily cadence: the queue only fires once, so arm the next occurrence
    // ourselves. A failure here must not re-deliver the notification we
    // just posted, so it does not fail the request.
    match state
        .reminder_scheduler
        .rearm_daily_reminder(
            &payload.user_id,
            &state.config.api_url,
            chrono::Local::now().naive_local(),
        )
        .await
    {
        Ok(Some(next)) => {
            tracing::info!(user_id = %payload.user_id, %next, "Daily reminder re-armed");
        }
        Ok(None) => {
            tracing::info!(user_id = %payload.user_id, "Daily reminder not re-armed");
        }
        Err(e) => {
            tracing::warn!(user_id = %payload.user_id, error = %e, "Failed to re-arm daily reminder");
        }
    }

    StatusCode::OK
}

/// Deliver the one-shot blister-end reminder.
async fn send_blister_reminder(
    State(state): State<Arc<AppState>>,
    headers: axum::http::HeaderMap,
    Json(payload): Json<SendBlisterReminderPayload>,
) -> StatusCode {
    if !is_valid_queue(&headers) {
        tracing::warn!(
            user_id = %payload.user_id,
            "Security Alert: Blocked unauthorized access to send_blister_reminder"
        );
        return StatusCode::FORBIDDEN;
    }

    // The user may have flipped the switch off after scheduling; honor the
    // current preference at fire time.
    match state.store.get_reminder_switch(&payload.user_id).await {
        Ok(Some(true)) => {}
        Ok(_) => {
            tracing::info!(
                user_id = %payload.user_id,
                "Shopping reminder disabled since scheduling, skipping"
            );
            return StatusCode::OK;
        }
        Err(e) => {
            tracing::error!(user_id = %payload.user_id, error = %e, "Failed to read reminder switch");
            return StatusCode::INTERNAL_SERVER_ERROR;
        }
    }

    tracing::info!(
        user_id = %payload.user_id,
        reminder_date = %payload.reminder_date,
        "Delivering blister-end reminder"
    );

    match state
        .notification_service
        .post(
            &payload.user_id,
            &BLISTER_END_CHANNEL,
            "Your blister ends in 7 days!",
            "Refill or prepare your next pack.",
        )
        .await
    {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::error!(user_id = %payload.user_id, error = %e, "Failed to post blister reminder");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
