// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Pill-Tracker: Track daily medication intake
//!
//! This crate provides the backend API for the pill blister tracker:
//! per-day taken flags, blister settings, and reminder notifications
//! scheduled through Cloud Tasks callbacks.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use std::sync::Arc;

use config::Config;
use db::PillStore;
use services::{BlisterService, NotificationService, ReminderScheduler};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn PillStore>,
    pub blister_service: BlisterService,
    pub reminder_scheduler: ReminderScheduler,
    pub notification_service: NotificationService,
}
