// SPDX-License-Identifier: MIT

//! Assessor Admin: backend API for the building-assessment admin console.
//!
//! Serves user management, assessment review, the activity audit log, and
//! admin profile/two-factor flows over Firestore-backed data.

pub mod config;
pub mod db;
pub mod error;
pub mod listing;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use services::{ActivityRecorder, IdentityClient, TwoFactorService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub identity: IdentityClient,
    pub two_factor: TwoFactorService,
    pub recorder: ActivityRecorder,
}
