// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models shared between the store layer and the API.

pub mod blister;
pub mod settings;
pub mod user;

pub use blister::{BlisterConfig, BlisterState};
pub use settings::{parse_first_pill_date, parse_pill_count, PillTime};
pub use user::{Notification, NotificationChannel, PasswordResetToken, User};
