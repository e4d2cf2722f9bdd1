// SPDX-License-Identifier: MIT

//! Request validation tests.
//!
//! All of these requests must be rejected before any backend call, so
//! they run against the offline mock without touching Firestore or the
//! identity provider.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use tower::ServiceExt;

mod common;

async fn post_json(
    app: axum::Router,
    uri: &str,
    body: serde_json::Value,
) -> axum::http::Response<axum::body::Body> {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn test_login_rejects_invalid_email() {
    let (app, _) = common::create_test_app();

    let response = post_json(
        app,
        "/auth/login",
        serde_json::json!({ "email": "not-an-email", "password": "secret123" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_rejects_empty_password() {
    let (app, _) = common::create_test_app();

    let response = post_json(
        app,
        "/auth/login",
        serde_json::json!({ "email": "admin@example.com", "password": "" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_verify_2fa_rejects_malformed_codes() {
    for bad_code in ["12345", "1234567", "12a456", ""] {
        let (app, _) = common::create_test_app();

        let response = post_json(
            app,
            "/auth/verify-2fa",
            serde_json::json!({ "userId": "uid-1", "code": bad_code }),
        )
        .await;

        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "code {:?} must be rejected before any lookup",
            bad_code
        );
    }
}

#[tokio::test]
async fn test_verify_2fa_trims_whitespace_before_checking() {
    let (app, _) = common::create_test_app();

    // A well-formed code (after trimming) passes format validation and
    // reaches the code lookup, which the offline mock fails with a 500.
    let response = post_json(
        app,
        "/auth/verify-2fa",
        serde_json::json!({ "userId": "uid-1", "code": " 123456 " }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_forgot_password_rejects_invalid_email() {
    let (app, _) = common::create_test_app();

    let response = post_json(
        app,
        "/auth/forgot-password",
        serde_json::json!({ "email": "nope" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/nope")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
