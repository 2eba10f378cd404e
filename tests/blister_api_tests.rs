// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Blister grid loading and per-day toggling through the API.

use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

mod common;

/// Register a user and confirm a 28-pill blister starting 2025-06-01.
async fn setup_blister(app: &axum::Router) -> (String, String) {
    let (uid, token) = common::register_user(app, "user@example.com", "hunter2hunter2").await;

    for (uri, body) in [
        ("/api/settings/pill-count", json!({ "value": "28" })),
        ("/api/settings/first-pill-date", json!({ "value": "2025-06-01" })),
    ] {
        let response = app
            .clone()
            .oneshot(common::authed_json_request("PUT", uri, &token, body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    (uid, token)
}

#[tokio::test]
async fn unconfigured_blister_reports_placeholder() {
    let (app, _state, _store) = common::create_test_app();
    let (_uid, token) = common::register_user(&app, "user@example.com", "hunter2hunter2").await;

    let response = app
        .oneshot(common::authed_request("GET", "/api/blister", &token))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::response_json(response).await;
    assert_eq!(body["configured"], false);
    assert_eq!(body["days"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn blister_has_one_day_per_pill() {
    let (app, _state, _store) = common::create_test_app();
    let (_uid, token) = setup_blister(&app).await;

    let response = app
        .oneshot(common::authed_request("GET", "/api/blister", &token))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::response_json(response).await;

    assert_eq!(body["configured"], true);
    assert_eq!(body["starting_date"], "01.06.2025");
    assert_eq!(body["range_label"], "June 2025 - June 2025");

    let days = body["days"].as_array().unwrap();
    assert_eq!(days.len(), 28);
    assert_eq!(days[0]["date"], "2025-06-01");
    assert_eq!(days[0]["label"], "1 Jun");
    assert_eq!(days[14]["label"], "15 Jun");
    assert_eq!(days[27]["date"], "2025-06-28");
    assert!(days.iter().all(|d| d["taken"] == false));
}

#[tokio::test]
async fn toggle_flips_exactly_one_day() {
    let (app, _state, store) = common::create_test_app();
    let (uid, token) = setup_blister(&app).await;

    let response = app
        .clone()
        .oneshot(common::authed_json_request(
            "POST",
            "/api/blister/3/toggle",
            &token,
            json!({}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::response_json(response).await;
    assert_eq!(body["index"], 3);
    assert_eq!(body["date"], "2025-06-04");
    assert_eq!(body["taken"], true);

    // Exactly one pill-state write, to the path for first date + 3.
    assert_eq!(
        store.writes_to("pillStates/"),
        vec![format!("pillStates/{uid}/2025-06-04")]
    );

    // Reloading shows the flip at position 3 and nowhere else.
    let response = app
        .oneshot(common::authed_request("GET", "/api/blister", &token))
        .await
        .unwrap();
    let body = common::response_json(response).await;
    let days = body["days"].as_array().unwrap();
    for (i, day) in days.iter().enumerate() {
        assert_eq!(day["taken"] == true, i == 3, "position {i}");
    }
}

#[tokio::test]
async fn toggle_twice_returns_to_untaken() {
    let (app, _state, _store) = common::create_test_app();
    let (_uid, token) = setup_blister(&app).await;

    for expected in [true, false] {
        let response = app
            .clone()
            .oneshot(common::authed_json_request(
                "POST",
                "/api/blister/0/toggle",
                &token,
                json!({}),
            ))
            .await
            .unwrap();
        let body = common::response_json(response).await;
        assert_eq!(body["taken"], expected);
    }
}

#[tokio::test]
async fn toggle_out_of_range_is_rejected() {
    let (app, _state, store) = common::create_test_app();
    let (_uid, token) = setup_blister(&app).await;

    let response = app
        .oneshot(common::authed_json_request(
            "POST",
            "/api/blister/28/toggle",
            &token,
            json!({}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(store.writes_to("pillStates/").is_empty());
}

#[tokio::test]
async fn toggle_without_configuration_is_not_found() {
    let (app, _state, _store) = common::create_test_app();
    let (_uid, token) = common::register_user(&app, "user@example.com", "hunter2hunter2").await;

    let response = app
        .oneshot(common::authed_json_request(
            "POST",
            "/api/blister/0/toggle",
            &token,
            json!({}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn guest_cannot_access_blister() {
    let (app, _state, _store) = common::create_test_app();

    let response = app
        .clone()
        .oneshot(
            axum::http::Request::builder()
                .method("GET")
                .uri("/api/blister")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(common::authed_request(
            "GET",
            "/api/blister",
            "not-a-valid-token",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn users_see_only_their_own_blister() {
    let (app, _state, _store) = common::create_test_app();
    let (_uid, token_a) = setup_blister(&app).await;

    // Second user with the same configuration.
    let (_uid_b, token_b) = common::register_user(&app, "other@example.com", "hunter2hunter2").await;
    for (uri, body) in [
        ("/api/settings/pill-count", json!({ "value": "28" })),
        ("/api/settings/first-pill-date", json!({ "value": "2025-06-01" })),
    ] {
        app.clone()
            .oneshot(common::authed_json_request("PUT", uri, &token_b, body))
            .await
            .unwrap();
    }

    app.clone()
        .oneshot(common::authed_json_request(
            "POST",
            "/api/blister/5/toggle",
            &token_a,
            json!({}),
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(common::authed_request("GET", "/api/blister", &token_b))
        .await
        .unwrap();
    let body = common::response_json(response).await;
    assert!(
        body["days"].as_array().unwrap().iter().all(|d| d["taken"] == false),
        "user B must not see user A's flags"
    );
}
