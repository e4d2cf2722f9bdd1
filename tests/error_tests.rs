// SPDX-License-Identifier: MIT

//! Error-to-response mapping tests.

use assessor_admin::error::AppError;
use axum::http::StatusCode;
use axum::response::IntoResponse;

async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_admin_only_maps_to_403() {
    let (status, body) = body_json(AppError::AdminOnly).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "admin_only");
    assert_eq!(body["details"], "Access denied. Admin only.");
}

#[tokio::test]
async fn test_expired_and_wrong_codes_are_distinct() {
    let (expired_status, expired) = body_json(AppError::CodeExpired).await;
    let (mismatch_status, mismatch) = body_json(AppError::CodeMismatch).await;

    assert_eq!(expired_status, StatusCode::BAD_REQUEST);
    assert_eq!(mismatch_status, StatusCode::BAD_REQUEST);
    assert_eq!(expired["error"], "code_expired");
    assert_eq!(mismatch["error"], "code_mismatch");
    assert_ne!(expired["details"], mismatch["details"]);
}

#[tokio::test]
async fn test_upstream_failures_map_to_502() {
    let (status, body) = body_json(AppError::Identity("QUOTA_EXCEEDED".into())).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "identity_error");

    let (status, _) = body_json(AppError::Email("timeout".into())).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_database_errors_hide_details() {
    let (status, body) = body_json(AppError::Database("connection string leak".into())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "database_error");
    assert!(body.get("details").is_none());
}

#[tokio::test]
async fn test_not_found_and_bad_request_carry_messages() {
    let (status, body) = body_json(AppError::NotFound("User uid-1 not found".into())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["details"], "User uid-1 not found");

    let (status, body) = body_json(AppError::BadRequest("Passwords do not match".into())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"], "Passwords do not match");
}
