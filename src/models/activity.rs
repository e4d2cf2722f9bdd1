// SPDX-License-Identifier: MIT

//! Audit log model.
//!
//! Entries in `activityLog/{id}` are append-only: written after each
//! mutating admin action, never updated or deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::listing::Chronological;

/// Known admin action kinds. Unknown values deserialize to [`Self::Other`]
/// and render with generic title/icon metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    UserViewed,
    UserCreated,
    UserUpdated,
    UserDeleted,
    UserSuspended,
    UserUnsuspended,
    AssessmentViewed,
    AssessmentDeleted,
    AssessmentAdded,
    ProfileUpdated,
    PasswordChanged,
    Login,
    Logout,
    #[serde(rename = "2fa_verified")]
    TwoFaVerified,
    #[serde(other)]
    Other,
}

impl ActivityAction {
    /// Feed title for the action.
    pub fn title(&self) -> &'static str {
        match self {
            Self::UserViewed => "User Viewed",
            Self::UserCreated => "New User Registered",
            Self::UserUpdated => "User Updated",
            Self::UserDeleted => "User Deleted",
            Self::UserSuspended => "User Suspended",
            Self::UserUnsuspended => "User Unsuspended",
            Self::AssessmentViewed => "Assessment Viewed",
            Self::AssessmentDeleted => "Assessment Deleted",
            Self::AssessmentAdded => "New Assessment Submitted",
            Self::ProfileUpdated => "Profile Updated",
            Self::PasswordChanged => "Password Changed",
            Self::Login => "Admin Login",
            Self::Logout => "Admin Logout",
            Self::TwoFaVerified => "2FA Verified",
            Self::Other => "Activity Recorded",
        }
    }

    /// Feed icon name for the action.
    pub fn icon(&self) -> &'static str {
        match self {
            Self::UserViewed => "bi-eye-fill",
            Self::UserCreated => "bi-person-plus-fill",
            Self::UserUpdated => "bi-pencil-square",
            Self::UserDeleted => "bi-trash-fill",
            Self::UserSuspended => "bi-pause-circle-fill",
            Self::UserUnsuspended => "bi-check-circle-fill",
            Self::AssessmentViewed => "bi-file-earmark-text-fill",
            Self::AssessmentDeleted => "bi-x-circle-fill",
            Self::AssessmentAdded => "bi-file-earmark-plus-fill",
            Self::ProfileUpdated => "bi-pencil-square",
            Self::PasswordChanged => "bi-shield-lock-fill",
            Self::Login => "bi-box-arrow-in-right",
            Self::Logout => "bi-box-arrow-right",
            Self::TwoFaVerified => "bi-shield-check",
            Self::Other => "bi-circle-fill",
        }
    }

    /// Feed icon color class for the action.
    pub fn icon_color(&self) -> &'static str {
        match self {
            Self::UserViewed => "info",
            Self::UserCreated => "success",
            Self::UserUpdated => "info",
            Self::UserDeleted => "danger",
            Self::UserSuspended => "warning",
            Self::UserUnsuspended => "success",
            Self::AssessmentViewed => "primary",
            Self::AssessmentDeleted => "danger",
            Self::AssessmentAdded => "success",
            Self::ProfileUpdated => "info",
            Self::PasswordChanged => "warning",
            Self::Login => "success",
            Self::Logout => "warning",
            Self::TwoFaVerified => "success",
            Self::Other => "secondary",
        }
    }
}

/// One append-only audit entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogEntry {
    pub action: ActivityAction,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub admin_email: String,
    #[serde(default, with = "firestore::serialize_as_optional_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl ActivityLogEntry {
    pub fn new(action: ActivityAction, description: String, admin_email: String) -> Self {
        Self {
            action,
            description,
            admin_email,
            // Filled at write time; all audit writes flow through the
            // recorder, so the write-time clock is the record's clock.
            timestamp: None,
        }
    }
}

impl Chronological for ActivityLogEntry {
    fn occurred_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_action_round_trip() {
        let json = serde_json::to_string(&ActivityAction::UserSuspended).unwrap();
        assert_eq!(json, "\"user_suspended\"");

        let action: ActivityAction = serde_json::from_str("\"assessment_viewed\"").unwrap();
        assert_eq!(action, ActivityAction::AssessmentViewed);
    }

    #[test]
    fn test_2fa_action_wire_name() {
        let action: ActivityAction = serde_json::from_str("\"2fa_verified\"").unwrap();
        assert_eq!(action, ActivityAction::TwoFaVerified);
    }

    #[test]
    fn test_unknown_action_renders_generic() {
        let action: ActivityAction = serde_json::from_str("\"report_exported\"").unwrap();
        assert_eq!(action, ActivityAction::Other);
        assert_eq!(action.title(), "Activity Recorded");
        assert_eq!(action.icon(), "bi-circle-fill");
        assert_eq!(action.icon_color(), "secondary");
    }
}
