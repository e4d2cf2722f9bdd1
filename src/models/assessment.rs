// SPDX-License-Identifier: MIT

//! Assessment models.
//!
//! Raw assessment documents under `users/{uid}/assessments/{id}` come in
//! several historical shapes (timestamp formats, root-vs-nested building
//! fields, wrapped recommendation maps). The raw document is kept as a
//! loosely-typed map and normalized once at load time by
//! [`crate::services::aggregate`]; nothing downstream branches on shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::listing::Chronological;

/// Raw assessment document plus its ID, as fetched from Firestore.
#[derive(Debug, Clone, Deserialize)]
pub struct RawAssessment {
    #[serde(rename = "_firestore_id")]
    pub id: String,
    #[serde(flatten)]
    pub data: serde_json::Value,
}

/// One damage-detection result for a submitted photo.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageFinding {
    #[serde(default)]
    pub image_uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_level: Option<String>,
    #[serde(default)]
    pub detected_issues: Vec<DetectedIssue>,
    /// Raw recommendation maps; either flat or wrapped one level under a
    /// `"0"` key. Deduplicated by the aggregator, never read directly.
    #[serde(default)]
    pub recommendations: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedIssue {
    #[serde(default, rename = "type")]
    pub issue_type: String,
    #[serde(default)]
    pub level: String,
    /// Fraction in [0, 1].
    #[serde(default)]
    pub confidence: f64,
}

/// One deduplicated recommendation group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub title: String,
    pub description: String,
    pub severity: String,
    pub actions: Vec<String>,
    /// Number of findings that produced this recommendation.
    pub count: u32,
}

/// Issue counts by damage type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TypeCounts {
    pub crack: u32,
    pub paint: u32,
    pub algae: u32,
}

/// Issue counts by severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeverityCounts {
    pub high: u32,
    pub moderate: u32,
    pub low: u32,
}

/// Aggregated issue counters for one assessment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IssueTotals {
    pub by_type: TypeCounts,
    pub by_severity: SeverityCounts,
}

impl IssueTotals {
    /// Total issue count derived from the sub-counters.
    pub fn total(&self) -> u32 {
        self.by_severity.high + self.by_severity.moderate + self.by_severity.low
    }
}

/// Badge class for a risk level, shared by overall and per-image risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskBadge {
    Danger,
    Warning,
    Success,
    Neutral,
}

/// Status summary for one submitted image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FindingStatus {
    pub text: String,
    pub class: &'static str,
}

/// Canonical assessment record produced by normalization.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentRecord {
    pub id: String,
    /// Owning user's UID (assessments are a sub-collection).
    pub user_id: String,
    /// Owner display name, denormalized for the list page.
    pub user_name: String,
    /// Assessment name, falling back to the building type.
    pub name: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub building_type: String,
    pub floors: String,
    pub material: String,
    pub foundation: String,
    pub environment: String,
    pub construction_year: String,
    pub renovation_year: String,
    pub occupancy: String,
    pub notes: String,
    pub previous_issues: Vec<String>,
    /// Risk level display text, e.g. "High Risk".
    pub risk_level: String,
    pub risk_badge: RiskBadge,
    pub total_issues: u32,
    pub totals: IssueTotals,
    pub findings: Vec<ImageFinding>,
}

impl Chronological for AssessmentRecord {
    fn occurred_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }
}
