//! Database layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    /// Per-user sub-collection of assessment documents.
    pub const ASSESSMENTS: &str = "assessments";
    pub const ACTIVITY_LOG: &str = "activityLog";
    /// One code document per user, keyed by UID.
    pub const VERIFICATION_CODES: &str = "verificationCodes";
}
