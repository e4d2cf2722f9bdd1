// SPDX-License-Identifier: MIT

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running.
//! Run with FIRESTORE_EMULATOR_HOST set.
//!
//! The emulator provides a clean state for each test run.

use assessor_admin::models::{ActivityAction, ActivityLogEntry, UserRecord, VerificationCode};
use chrono::Utc;

mod common;
use common::test_db;

/// Generate a unique UID for test isolation.
fn unique_uid() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("test-uid-{}", nanos)
}

fn test_user(uid: &str) -> UserRecord {
    UserRecord::new(
        uid.to_string(),
        "Test User".to_string(),
        format!("{}@example.com", uid),
        "User".to_string(),
    )
}

#[tokio::test]
async fn test_user_round_trip_and_suspension() {
    require_emulator!();
    let db = test_db().await;
    let uid = unique_uid();

    let mut user = test_user(&uid);
    db.upsert_user(&user).await.unwrap();

    let fetched = db.get_user(&uid).await.unwrap().unwrap();
    assert_eq!(fetched.user_id, uid);
    assert!(!fetched.suspended());

    user.set_suspended(true, Utc::now());
    db.upsert_user(&user).await.unwrap();

    let fetched = db.get_user(&uid).await.unwrap().unwrap();
    assert!(fetched.suspended());
    assert!(fetched.is_suspended);
    assert!(fetched.suspended_at.is_some());

    db.delete_user_data(&uid).await.unwrap();
    assert!(db.get_user(&uid).await.unwrap().is_none());
}

#[tokio::test]
async fn test_verification_code_lifecycle() {
    require_emulator!();
    let db = test_db().await;
    let uid = unique_uid();

    assert!(db.get_verification_code(&uid).await.unwrap().is_none());

    let code = VerificationCode::new("654321".to_string(), Utc::now());
    db.set_verification_code(&uid, &code).await.unwrap();

    let stored = db.get_verification_code(&uid).await.unwrap().unwrap();
    assert_eq!(stored.code, "654321");
    assert!(!stored.is_expired(Utc::now()));

    // A resend replaces the stored code.
    let newer = VerificationCode::new("111222".to_string(), Utc::now());
    db.set_verification_code(&uid, &newer).await.unwrap();
    let stored = db.get_verification_code(&uid).await.unwrap().unwrap();
    assert_eq!(stored.code, "111222");

    db.delete_verification_code(&uid).await.unwrap();
    assert!(db.get_verification_code(&uid).await.unwrap().is_none());
}

#[tokio::test]
async fn test_activity_log_appends_and_orders_newest_first() {
    require_emulator!();
    let db = test_db().await;
    let marker = unique_uid();

    for i in 0..3 {
        let mut entry = ActivityLogEntry::new(
            ActivityAction::UserViewed,
            format!("{} entry {}", marker, i),
            "admin@example.com".to_string(),
        );
        entry.timestamp = Some(Utc::now());
        db.add_activity(&entry).await.unwrap();
    }

    let all = db.list_activities().await.unwrap();
    let ours: Vec<_> = all
        .iter()
        .filter(|e| e.description.starts_with(&marker))
        .collect();
    assert_eq!(ours.len(), 3);

    // Descending by timestamp: entry 2 first.
    assert!(ours[0].description.ends_with("entry 2"));
    assert!(ours[2].description.ends_with("entry 0"));

    // The range query covers at least the entries just written, and a
    // future cutoff excludes them all.
    let day_ago = Utc::now() - chrono::Duration::hours(24);
    assert!(db.count_activities_since(day_ago).await.unwrap() >= 3);

    let future = Utc::now() + chrono::Duration::hours(1);
    assert_eq!(db.count_activities_since(future).await.unwrap(), 0);
}

#[tokio::test]
async fn test_delete_user_data_removes_assessments() {
    require_emulator!();
    let db = test_db().await;
    let uid = unique_uid();

    db.upsert_user(&test_user(&uid)).await.unwrap();

    // No assessments yet; deletion still removes profile and code slot.
    let deleted = db.delete_user_data(&uid).await.unwrap();
    assert!(deleted >= 2);
    assert!(db.get_user(&uid).await.unwrap().is_none());
    assert!(db.list_assessments_for_user(&uid).await.unwrap().is_empty());
}
