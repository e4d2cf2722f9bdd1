// SPDX-License-Identifier: MIT

use assessor_admin::config::Config;
use assessor_admin::db::FirestoreDb;
use assessor_admin::routes::create_router;
use assessor_admin::services::{ActivityRecorder, IdentityClient, Mailer, TwoFactorService};
use assessor_admin::AppState;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let db = test_db_offline();

    let identity = IdentityClient::new(config.identity_api_key.clone());
    let mailer = Mailer::new(
        config.email_service_id.clone(),
        config.email_template_id.clone(),
        config.email_public_key.clone(),
    );
    let two_factor = TwoFactorService::new(db.clone(), mailer);
    let recorder = ActivityRecorder::new(db.clone());

    let state = Arc::new(AppState {
        config,
        db,
        identity,
        two_factor,
        recorder,
    });

    (create_router(state.clone()), state)
}
