// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod activity;
pub mod assessment;
pub mod user;
pub mod verification;

pub use activity::{ActivityAction, ActivityLogEntry};
pub use assessment::{
    AssessmentRecord, DetectedIssue, FindingStatus, ImageFinding, IssueTotals, RawAssessment,
    Recommendation, RiskBadge, SeverityCounts, TypeCounts,
};
pub use user::{AccountStatus, UserRecord};
pub use verification::VerificationCode;
