// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Origin checks and delivery behavior of the Cloud Tasks callback
//! endpoints.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use pill_tracker::db::PillStore;
use serde_json::json;
use tower::ServiceExt;

mod common;

fn task_request(uri: &str, queue: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(queue) = queue {
        builder = builder.header("x-cloudtasks-queuename", queue);
    }
    builder
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

#[tokio::test]
async fn pill_reminder_requires_queue_header() {
    let (app, _state, store) = common::create_test_app();

    let response = app
        .oneshot(task_request(
            "/tasks/send-pill-reminder",
            None,
            json!({ "user_id": "u1" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(store.notifications_for("u1").is_empty());
}

#[tokio::test]
async fn pill_reminder_rejects_foreign_queue() {
    let (app, _state, store) = common::create_test_app();

    let response = app
        .oneshot(task_request(
            "/tasks/send-pill-reminder",
            Some("some-other-queue"),
            json!({ "user_id": "u1" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(store.notifications_for("u1").is_empty());
}

#[tokio::test]
async fn pill_reminder_posts_notification() {
    let (app, _state, store) = common::create_test_app();

    let response = app
        .oneshot(task_request(
            "/tasks/send-pill-reminder",
            Some("pill-reminders"),
            json!({ "user_id": "u1" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let notifications = store.notifications_for("u1");
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].title, "Pill Reminder");
    assert_eq!(notifications[0].body, "Time to take your pill!");
    assert_eq!(notifications[0].channel, "pill-reminder");
}

#[tokio::test]
async fn blister_reminder_honors_current_switch_state() {
    let (app, _state, store) = common::create_test_app();
    let payload = json!({ "user_id": "u1", "reminder_date": "2025-06-22" });

    // Switch off at fire time: delivery is skipped.
    store
        .set_reminder_switch("u1", false)
        .await
        .expect("set switch");
    let response = app
        .clone()
        .oneshot(task_request(
            "/tasks/send-blister-reminder",
            Some("pill-reminders"),
            payload.clone(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(store.notifications_for("u1").is_empty());

    // Switch on: the reminder is delivered.
    store
        .set_reminder_switch("u1", true)
        .await
        .expect("set switch");
    let response = app
        .oneshot(task_request(
            "/tasks/send-blister-reminder",
            Some("pill-reminders"),
            payload,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let notifications = store.notifications_for("u1");
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].title, "Your blister ends in 7 days!");
    assert_eq!(notifications[0].body, "Refill or prepare your next pack.");
    assert_eq!(notifications[0].channel, "blister-end");
}

#[tokio::test]
async fn blister_reminder_requires_queue_header() {
    let (app, _state, store) = common::create_test_app();
    store
        .set_reminder_switch("u1", true)
        .await
        .expect("set switch");

    let response = app
        .oneshot(task_request(
            "/tasks/send-blister-reminder",
            None,
            json!({ "user_id": "u1", "reminder_date": "2025-06-22" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(store.notifications_for("u1").is_empty());
}
