// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Pill-Tracker API Server
//!
//! Backend for the pill blister tracker: per-day taken flags in
//! Firestore, validated blister settings, and reminder notifications
//! delivered through Cloud Tasks callbacks.

use pill_tracker::{
    config::Config,
    db::FirestoreDb,
    services::{BlisterService, NotificationService, ReminderScheduler, TasksService},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Pill-Tracker API");

    // Initialize Firestore database
    let store: Arc<dyn pill_tracker::db::PillStore> = Arc::new(
        FirestoreDb::new(&config.gcp_project_id)
            .await
            .expect("Failed to connect to Firestore"),
    );

    // Initialize Cloud Tasks service
    let tasks_service = Arc::new(TasksService::new(
        &config.gcp_project_id,
        &config.gcp_region,
    ));
    tracing::info!(
        project = %config.gcp_project_id,
        "Cloud Tasks service initialized"
    );

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        store: store.clone(),
        blister_service: BlisterService::new(store.clone()),
        reminder_scheduler: ReminderScheduler::new(store.clone(), tasks_service),
        notification_service: NotificationService::new(store),
    });

    // Build router
    let app = pill_tracker::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pill_tracker=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
