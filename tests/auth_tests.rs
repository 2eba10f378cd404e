// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Registration, login, logout, and password reset flows.

use axum::http::{header, StatusCode};
use serde_json::json;
use tower::ServiceExt;

mod common;

#[tokio::test]
async fn register_returns_session_and_cookie() {
    let (app, _state, _store) = common::create_test_app();

    let response = app
        .oneshot(common::json_request(
            "POST",
            "/auth/register",
            json!({ "email": "user@example.com", "password": "hunter2hunter2" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(cookie.contains("pill_token="), "session cookie should be set");

    let body = common::response_json(response).await;
    assert_eq!(body["email"], "user@example.com");
    assert_eq!(body["message"], "Registration successful");
    assert!(!body["token"].as_str().unwrap().is_empty());
    assert!(!body["uid"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn register_rejects_invalid_email() {
    let (app, _state, _store) = common::create_test_app();

    let response = app
        .oneshot(common::json_request(
            "POST",
            "/auth/register",
            json!({ "email": "invalid-email", "password": "hunter2hunter2" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = common::response_json(response).await;
    assert_eq!(body["details"], "Invalid email or password");
}

#[tokio::test]
async fn register_rejects_empty_password() {
    let (app, _state, _store) = common::create_test_app();

    let response = app
        .oneshot(common::json_request(
            "POST",
            "/auth/register",
            json!({ "email": "user@example.com", "password": "" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = common::response_json(response).await;
    assert_eq!(body["details"], "All the fields must be filled");
}

#[tokio::test]
async fn register_rejects_duplicate_email() {
    let (app, _state, _store) = common::create_test_app();
    common::register_user(&app, "user@example.com", "hunter2hunter2").await;

    let response = app
        .oneshot(common::json_request(
            "POST",
            "/auth/register",
            json!({ "email": "user@example.com", "password": "other-password" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = common::response_json(response).await;
    assert_eq!(body["details"], "Registration failed.");
}

#[tokio::test]
async fn login_accepts_registered_credentials() {
    let (app, _state, _store) = common::create_test_app();
    let (uid, _token) = common::register_user(&app, "user@example.com", "hunter2hunter2").await;

    let response = app
        .oneshot(common::json_request(
            "POST",
            "/auth/login",
            json!({ "email": "user@example.com", "password": "hunter2hunter2" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::response_json(response).await;
    assert_eq!(body["uid"], uid.as_str());
    assert_eq!(body["message"], "Login successful");
}

#[tokio::test]
async fn login_rejects_wrong_password() {
    let (app, _state, _store) = common::create_test_app();
    common::register_user(&app, "user@example.com", "hunter2hunter2").await;

    let response = app
        .oneshot(common::json_request(
            "POST",
            "/auth/login",
            json!({ "email": "user@example.com", "password": "wrong-password" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_rejects_unknown_email_identically() {
    let (app, _state, _store) = common::create_test_app();

    let response = app
        .oneshot(common::json_request(
            "POST",
            "/auth/login",
            json!({ "email": "nobody@example.com", "password": "hunter2hunter2" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn session_token_grants_api_access() {
    let (app, _state, _store) = common::create_test_app();
    let (uid, token) = common::register_user(&app, "user@example.com", "hunter2hunter2").await;

    let response = app
        .oneshot(common::authed_request("GET", "/api/me", &token))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::response_json(response).await;
    assert_eq!(body["uid"], uid.as_str());
    assert_eq!(body["email"], "user@example.com");
}

#[tokio::test]
async fn logout_clears_session_cookie() {
    let (app, _state, _store) = common::create_test_app();

    let response = app
        .oneshot(
            axum::http::Request::builder()
                .method("GET")
                .uri("/auth/logout")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default();
    assert!(
        cookie.starts_with("pill_token="),
        "removal cookie should target the session cookie"
    );
}

#[tokio::test]
async fn password_reset_round_trip() {
    let (app, _state, store) = common::create_test_app();
    let (uid, _token) = common::register_user(&app, "user@example.com", "old-password").await;

    // Request a reset; the token record stands in for the outbound email.
    let response = app
        .clone()
        .oneshot(common::json_request(
            "POST",
            "/auth/reset-password",
            json!({ "email": "user@example.com" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::response_json(response).await;
    assert_eq!(body["message"], "Email with reset link sent!");

    let reset = store.reset_token_for(&uid).expect("reset token stored");

    // Confirm with the token.
    let response = app
        .clone()
        .oneshot(common::json_request(
            "POST",
            "/auth/reset-password/confirm",
            json!({ "token": reset.token, "password": "new-password" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Old password no longer works; new one does.
    let response = app
        .clone()
        .oneshot(common::json_request(
            "POST",
            "/auth/login",
            json!({ "email": "user@example.com", "password": "old-password" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(common::json_request(
            "POST",
            "/auth/login",
            json!({ "email": "user@example.com", "password": "new-password" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn password_reset_does_not_reveal_unknown_emails() {
    let (app, _state, store) = common::create_test_app();

    let response = app
        .oneshot(common::json_request(
            "POST",
            "/auth/reset-password",
            json!({ "email": "nobody@example.com" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::response_json(response).await;
    assert_eq!(body["message"], "Email with reset link sent!");
    assert!(store.writes_to("resetTokens/").is_empty());
}

#[tokio::test]
async fn reset_confirm_rejects_unknown_token() {
    let (app, _state, _store) = common::create_test_app();

    let response = app
        .oneshot(common::json_request(
            "POST",
            "/auth/reset-password/confirm",
            json!({ "token": "not-a-token", "password": "new-password" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
