// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::settings::{parse_first_pill_date, parse_pill_count, PillTime};
use crate::services::blister::ToggleOutcome;
use crate::services::reminders::ScheduleOutcome;
use crate::time_utils::{format_pill_day, format_range_label, format_start_date};
use crate::AppState;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/blister", get(get_blister))
        .route("/api/blister/{index}/toggle", post(toggle_pill))
        .route(
            "/api/settings/pill-count",
            get(get_pill_count).put(put_pill_count),
        )
        .route(
            "/api/settings/first-pill-date",
            get(get_first_pill_date).put(put_first_pill_date),
        )
        .route(
            "/api/settings/pill-time",
            get(get_pill_time).put(put_pill_time),
        )
        .route(
            "/api/settings/shopping-reminder",
            get(get_shopping_reminder).put(put_shopping_reminder),
        )
        .route("/api/reminders/refresh", post(refresh_reminders))
}

// ─── User Profile ────────────────────────────────────────────

/// Current user response.
#[derive(Serialize)]
pub struct UserResponse {
    pub uid: String,
    pub email: String,
}

/// Get current user profile.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserResponse>> {
    let profile = state
        .store
        .get_user(&user.uid)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user.uid)))?;

    Ok(Json(UserResponse {
        uid: profile.uid,
        email: profile.email,
    }))
}

// ─── Blister ─────────────────────────────────────────────────

/// One position of the blister grid.
#[derive(Serialize)]
pub struct BlisterDay {
    pub index: usize,
    pub date: NaiveDate,
    /// Short label shown on the grid position, e.g. `15 Jun`
    pub label: String,
    pub taken: bool,
}

#[derive(Serialize)]
pub struct BlisterResponse {
    /// False until both pill count and first pill date are confirmed;
    /// the client renders its placeholder in that case.
    pub configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starting_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range_label: Option<String>,
    pub days: Vec<BlisterDay>,
}

/// Load the full blister: one taken flag per day in the range.
async fn get_blister(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<BlisterResponse>> {
    let Some(config) = state.blister_service.config_for(&user.uid).await? else {
        return Ok(Json(BlisterResponse {
            configured: false,
            starting_date: None,
            range_label: None,
            days: Vec::new(),
        }));
    };

    let blister_state = state.blister_service.load(&user.uid, &config).await?;

    let days = config
        .dates()
        .into_iter()
        .enumerate()
        .map(|(index, date)| BlisterDay {
            index,
            date,
            label: format_pill_day(date),
            taken: blister_state.get(index).unwrap_or(false),
        })
        .collect();

    Ok(Json(BlisterResponse {
        configured: true,
        starting_date: Some(format_start_date(config.first_pill_date)),
        range_label: Some(format_range_label(config.first_pill_date, config.last_day())),
        days,
    }))
}

/// Flip the taken flag at one blister position.
async fn toggle_pill(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(index): Path<usize>,
) -> Result<Json<ToggleOutcome>> {
    let config = state
        .blister_service
        .config_for(&user.uid)
        .await?
        .ok_or_else(|| AppError::NotFound("Blister not configured".to_string()))?;

    let outcome = state
        .blister_service
        .toggle(&user.uid, &config, index)
        .await?;

    Ok(Json(outcome))
}

// ─── Settings: Pill Count ────────────────────────────────────

#[derive(Deserialize)]
pub struct RawValueRequest {
    #[serde(default)]
    pub value: String,
}

#[derive(Serialize)]
pub struct PillCountResponse {
    pub value: Option<u32>,
}

async fn get_pill_count(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<PillCountResponse>> {
    Ok(Json(PillCountResponse {
        value: state.store.get_pill_count(&user.uid).await?,
    }))
}

/// Confirm the number of pills in one blister pack.
async fn put_pill_count(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<RawValueRequest>,
) -> Result<Json<PillCountResponse>> {
    // The raw text is mirrored on every submission, valid or not, the way
    // the original field mirrors each keystroke.
    state
        .store
        .set_pill_type_raw(&user.uid, &payload.value)
        .await?;

    let count = parse_pill_count(&payload.value)?;
    state.store.set_pill_count(&user.uid, count).await?;

    Ok(Json(PillCountResponse { value: Some(count) }))
}

// ─── Settings: First Pill Date ───────────────────────────────

#[derive(Serialize)]
pub struct FirstPillDateResponse {
    /// ISO `yyyy-MM-dd`
    pub value: Option<NaiveDate>,
}

async fn get_first_pill_date(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<FirstPillDateResponse>> {
    Ok(Json(FirstPillDateResponse {
        value: state.store.get_first_pill_date(&user.uid).await?,
    }))
}

/// Confirm the starting date of the blister.
async fn put_first_pill_date(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<RawValueRequest>,
) -> Result<Json<FirstPillDateResponse>> {
    let date = parse_first_pill_date(&payload.value)?;
    state.store.set_first_pill_date(&user.uid, date).await?;

    Ok(Json(FirstPillDateResponse { value: Some(date) }))
}

// ─── Settings: Reminder Time ─────────────────────────────────

#[derive(Deserialize)]
pub struct PillTimeRequest {
    pub hour: u32,
    pub minute: u32,
}

#[derive(Serialize)]
pub struct PillTimeResponse {
    pub value: Option<PillTime>,
    /// Local instant the next daily reminder will fire, if armed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub armed_for: Option<String>,
}

async fn get_pill_time(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<PillTimeResponse>> {
    Ok(Json(PillTimeResponse {
        value: state.store.get_pill_time(&user.uid).await?,
        armed_for: None,
    }))
}

/// Confirm the daily reminder time and arm the reminder.
async fn put_pill_time(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<PillTimeRequest>,
) -> Result<Json<PillTimeResponse>> {
    let time = PillTime::new(payload.hour, payload.minute)?;
    state.store.set_pill_time(&user.uid, time).await?;

    let armed_for = state
        .reminder_scheduler
        .arm_daily_reminder(
            &user.uid,
            &state.config.api_url,
            chrono::Local::now().naive_local(),
        )
        .await?;

    Ok(Json(PillTimeResponse {
        value: Some(time),
        armed_for: armed_for.map(|at| at.format("%Y-%m-%dT%H:%M:%S").to_string()),
    }))
}

// ─── Settings: Shopping Reminder ─────────────────────────────

#[derive(Deserialize)]
pub struct ShoppingReminderRequest {
    pub enabled: bool,
}

#[derive(Serialize)]
pub struct ShoppingReminderResponse {
    pub enabled: bool,
    /// Outcome of the scheduling attempt triggered by enabling the switch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<ScheduleOutcome>,
}

async fn get_shopping_reminder(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ShoppingReminderResponse>> {
    Ok(Json(ShoppingReminderResponse {
        enabled: state
            .store
            .get_reminder_switch(&user.uid)
            .await?
            .unwrap_or(false),
        schedule: None,
    }))
}

/// Flip the "remind me to buy another pack" switch.
async fn put_shopping_reminder(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<ShoppingReminderRequest>,
) -> Result<Json<ShoppingReminderResponse>> {
    state
        .store
        .set_reminder_switch(&user.uid, payload.enabled)
        .await?;

    let schedule = if payload.enabled {
        Some(
            state
                .reminder_scheduler
                .schedule_blister_end(
                    &user.uid,
                    &state.config.api_url,
                    chrono::Local::now().naive_local(),
                )
                .await?,
        )
    } else {
        None
    };

    Ok(Json(ShoppingReminderResponse {
        enabled: payload.enabled,
        schedule,
    }))
}

// ─── Reminder Refresh ────────────────────────────────────────

#[derive(Serialize)]
pub struct RefreshResponse {
    pub outcome: ScheduleOutcome,
}

/// Re-run the blister-end scheduling check from persisted state.
///
/// Clients call this on startup, matching the original app's check on
/// entering the settings screen.
async fn refresh_reminders(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<RefreshResponse>> {
    let outcome = state
        .reminder_scheduler
        .schedule_blister_end(
            &user.uid,
            &state.config.api_url,
            chrono::Local::now().naive_local(),
        )
        .await?;

    Ok(Json(RefreshResponse { outcome }))
}
