// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod blister;
pub mod notifications;
pub mod reminders;
pub mod tasks;

pub use blister::{BlisterService, ToggleOutcome};
pub use notifications::NotificationService;
pub use reminders::{ReminderScheduler, ScheduleOutcome};
pub use tasks::TasksService;
