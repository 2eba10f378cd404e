// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request, Response};
use pill_tracker::config::Config;
use pill_tracker::db::MemoryStore;
use pill_tracker::routes::create_router;
use pill_tracker::services::{
    BlisterService, NotificationService, ReminderScheduler, TasksService,
};
use pill_tracker::AppState;
use std::sync::Arc;

/// Create a test app backed by the in-memory store.
/// Returns the router, the shared state, and the store for assertions.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>, Arc<MemoryStore>) {
    let config = Config::test_default();
    let store = Arc::new(MemoryStore::new());
    let store_dyn: Arc<dyn pill_tracker::db::PillStore> = store.clone();
    let tasks_service = Arc::new(TasksService::new(
        &config.gcp_project_id,
        &config.gcp_region,
    ));

    let state = Arc::new(AppState {
        config,
        store: store_dyn.clone(),
        blister_service: BlisterService::new(store_dyn.clone()),
        reminder_scheduler: ReminderScheduler::new(store_dyn.clone(), tasks_service),
        notification_service: NotificationService::new(store_dyn),
    });

    (create_router(state.clone()), state, store)
}

/// Create a signed session JWT for a test user.
#[allow(dead_code)]
pub fn create_test_jwt(uid: &str, signing_key: &[u8]) -> String {
    pill_tracker::middleware::auth::create_jwt(uid, signing_key).expect("JWT creation failed")
}

/// Build a JSON request.
#[allow(dead_code)]
pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).expect("serialize body")))
        .expect("build request")
}

/// Build an authenticated JSON request.
#[allow(dead_code)]
pub fn authed_json_request(
    method: &str,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::from(serde_json::to_vec(&body).expect("serialize body")))
        .expect("build request")
}

/// Build an authenticated bodyless request.
#[allow(dead_code)]
pub fn authed_request(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .expect("build request")
}

/// Read a JSON response body.
#[allow(dead_code)]
pub async fn response_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse body as JSON")
}

/// Register a user through the API and return `(uid, token)`.
#[allow(dead_code)]
pub async fn register_user(app: &axum::Router, email: &str, password: &str) -> (String, String) {
    use tower::ServiceExt;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/register",
            serde_json::json!({ "email": email, "password": password }),
        ))
        .await
        .expect("register request");

    assert_eq!(
        response.status(),
        axum::http::StatusCode::OK,
        "registration should succeed"
    );

    let body = response_json(response).await;
    (
        body["uid"].as_str().expect("uid in response").to_string(),
        body["token"].as_str().expect("token in response").to_string(),
    )
}
