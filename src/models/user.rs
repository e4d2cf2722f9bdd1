//! User profile model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::listing::Chronological;

/// Account status stored on the profile document.
///
/// Suspension is redundantly tracked by [`UserRecord::is_suspended`] for
/// backward compatibility with older mobile clients; `status` is the source
/// of truth and both fields are always written together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    #[default]
    Active,
    Suspended,
}

/// User profile stored at `users/{uid}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// Auth UID, duplicated into the document at creation time. The query
    /// layer backfills it from the document ID for older records.
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub status: AccountStatus,
    #[serde(default)]
    pub is_suspended: bool,
    #[serde(default)]
    pub is_admin: bool,
    /// Profile photo URL. Two historical field names exist in production
    /// data; use [`UserRecord::photo`] instead of reading either directly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(
        default,
        rename = "photoUrl1",
        skip_serializing_if = "Option::is_none"
    )]
    pub photo_url1: Option<String>,
    #[serde(default, with = "firestore::serialize_as_optional_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "firestore::serialize_as_optional_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, with = "firestore::serialize_as_optional_timestamp")]
    pub suspended_at: Option<DateTime<Utc>>,
    #[serde(default, with = "firestore::serialize_as_optional_timestamp")]
    pub unsuspended_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_notes: Option<String>,
    #[serde(
        default,
        rename = "last2FAVerification",
        with = "firestore::serialize_as_optional_timestamp"
    )]
    pub last_2fa_verification: Option<DateTime<Utc>>,
}

impl UserRecord {
    /// New active user document, as written by the account-creation flow.
    pub fn new(user_id: String, full_name: String, email: String, role: String) -> Self {
        Self {
            user_id,
            full_name,
            email,
            role,
            status: AccountStatus::Active,
            is_suspended: false,
            is_admin: false,
            photo_url: None,
            photo_url1: None,
            created_at: Some(Utc::now()),
            updated_at: None,
            suspended_at: None,
            unsuspended_at: None,
            admin_notes: None,
            last_2fa_verification: None,
        }
    }

    /// Whether the account is suspended.
    ///
    /// Historical data contains documents where only one of the two fields
    /// was written, so either field saying "suspended" counts.
    pub fn suspended(&self) -> bool {
        self.status == AccountStatus::Suspended || self.is_suspended
    }

    /// Set suspension state, keeping `status` and `isSuspended` in sync.
    pub fn set_suspended(&mut self, suspended: bool, now: DateTime<Utc>) {
        if suspended {
            self.status = AccountStatus::Suspended;
            self.is_suspended = true;
            self.suspended_at = Some(now);
        } else {
            self.status = AccountStatus::Active;
            self.is_suspended = false;
            self.unsuspended_at = Some(now);
        }
    }

    /// Profile photo URL across both historical field names.
    pub fn photo(&self) -> Option<&str> {
        [self.photo_url.as_deref(), self.photo_url1.as_deref()]
            .into_iter()
            .flatten()
            .find(|url| !url.is_empty())
    }

    /// Display name: full name, else the email, else the UID.
    pub fn display_name(&self) -> &str {
        if !self.full_name.is_empty() {
            &self.full_name
        } else if !self.email.is_empty() {
            &self.email
        } else {
            &self.user_id
        }
    }
}

impl Chronological for UserRecord {
    fn occurred_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
}
