// SPDX-License-Identifier: MIT

//! Assessor Admin API Server
//!
//! Backend for the building-assessment admin console: user management,
//! assessment review, activity audit log, and admin profile/2FA.

use assessor_admin::{
    config::Config,
    db::FirestoreDb,
    services::{ActivityRecorder, IdentityClient, Mailer, TwoFactorService},
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
    tracing::info!(port = config.port, "Starting Assessor Admin API");

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.gcp_project_id)
        .await
        .expect("Failed to connect to Firestore");

    let identity = IdentityClient::new(config.identity_api_key.clone());

    let mailer = Mailer::new(
        config.email_service_id.clone(),
        config.email_template_id.clone(),
        config.email_public_key.clone(),
    );
    let two_factor = TwoFactorService::new(db.clone(), mailer);

    let recorder = ActivityRecorder::new(db.clone());

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        identity,
        two_factor,
        recorder,
    });

    // Build router
    let app = assessor_admin::routes::create_router(state);

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
                .add_directive("assessor_admin=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
