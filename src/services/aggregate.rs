// SPDX-License-Identifier: MIT

//! Assessment normalization and aggregation.
//!
//! Raw assessment documents accumulated several historical shapes:
//! three timestamp encodings, building fields stored either at the root or
//! under `environmentalRisks`, issue counts in three different places, and
//! recommendation maps that are sometimes wrapped one level under a `"0"`
//! key. Everything is reconciled here, once, at load time; the canonical
//! [`AssessmentRecord`] is the only shape the rest of the code sees.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;

use crate::models::{
    AssessmentRecord, FindingStatus, ImageFinding, IssueTotals, RawAssessment, Recommendation,
    RiskBadge, UserRecord,
};

/// Sentinel for fields with no usable value.
pub const NOT_AVAILABLE: &str = "N/A";

/// Bare numeric timestamps above this are epoch-milliseconds, below it
/// epoch-seconds. A bare number is ambiguous, so the test order matters.
const MILLIS_THRESHOLD: f64 = 1e10;

/// Resolve an assessment's submission time.
///
/// Tried in order: the store-native timestamp, a numeric value above the
/// milliseconds threshold, a numeric value as seconds, then a plain `date`
/// field. Returns `None` when nothing usable is present.
pub fn resolve_timestamp(data: &Value) -> Option<DateTime<Utc>> {
    if let Some(ts) = data.get("timestamp") {
        if let Some(dt) = native_timestamp(ts) {
            return Some(dt);
        }
        if let Some(n) = ts.as_f64() {
            return if n > MILLIS_THRESHOLD {
                DateTime::from_timestamp_millis(n as i64)
            } else {
                DateTime::from_timestamp(n as i64, 0)
            };
        }
    }

    data.get("date").and_then(parse_date_text)
}

/// A timestamp as the document store itself encodes it: an RFC3339 string
/// or a `{seconds, nanos}` map (older exports use underscore prefixes).
fn native_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    if let Some(text) = value.as_str() {
        return DateTime::parse_from_rfc3339(text)
            .ok()
            .map(|dt| dt.with_timezone(&Utc));
    }

    let map = value.as_object()?;
    let seconds = map
        .get("seconds")
        .or_else(|| map.get("_seconds"))?
        .as_i64()?;
    let nanos = map
        .get("nanos")
        .or_else(|| map.get("_nanoseconds"))
        .and_then(Value::as_i64)
        .unwrap_or(0);
    DateTime::from_timestamp(seconds, nanos as u32)
}

fn parse_date_text(value: &Value) -> Option<DateTime<Utc>> {
    let text = value.as_str()?;
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    chrono::NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Building field lookup: the root key wins over the same logical field
/// nested under `environmentalRisks`; "N/A" when neither has a value.
pub fn resolve_field(data: &Value, root_key: &str, nested_key: &str) -> String {
    if let Some(text) = data.get(root_key).and_then(present_text) {
        return text;
    }
    data.get("environmentalRisks")
        .and_then(|risks| risks.get(nested_key))
        .and_then(present_text)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Displayable text for a field value; empty strings and zero don't count.
fn present_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    }
}

/// Sum issue counts from the pre-tallied per-type/per-severity counters.
///
/// The counters are written by the mobile analysis pipeline and are
/// authoritative over any recount from the raw findings.
pub fn issue_totals(data: &Value) -> IssueTotals {
    let crack = [
        counter(data, &["crackHighCount"]),
        counter(data, &["crackModerateCount"]),
        counter(data, &["crackLowCount"]),
    ];
    let paint = [
        counter(data, &["paintHighCount"]),
        counter(data, &["paintModerateCount"]),
        counter(data, &["paintLowCount"]),
    ];
    // The algae counters were renamed when moss detection merged in.
    let algae = [
        counter(data, &["algaeHighCount", "algaeMossHighCount"]),
        counter(data, &["algaeModerateCount", "algaeMossModerateCount"]),
        counter(data, &["algaeLowCount", "algaeMossLowCount"]),
    ];

    let mut totals = IssueTotals::default();
    totals.by_type.crack = crack.iter().sum();
    totals.by_type.paint = paint.iter().sum();
    totals.by_type.algae = algae.iter().sum();
    totals.by_severity.high = crack[0] + paint[0] + algae[0];
    totals.by_severity.moderate = crack[1] + paint[1] + algae[1];
    totals.by_severity.low = crack[2] + paint[2] + algae[2];
    totals
}

fn counter(data: &Value, keys: &[&str]) -> u32 {
    keys.iter()
        .find_map(|key| data.get(*key).and_then(Value::as_u64))
        .unwrap_or(0) as u32
}

/// Total issue count fallback chain: an explicit `totalIssues` field (zero
/// included), the nine `detectionSummary` buckets, the legacy `issuesFound`
/// field, then the sum of the pre-tallied counters.
pub fn total_issues(data: &Value, totals: &IssueTotals) -> u32 {
    if let Some(total) = data.get("totalIssues").and_then(Value::as_u64) {
        return total as u32;
    }

    if let Some(summary) = data.get("detectionSummary").and_then(Value::as_object) {
        return ["paintDamage", "crackDetection", "algaeMoss"]
            .iter()
            .filter_map(|group| summary.get(*group))
            .flat_map(|group| {
                ["high", "moderate", "low"]
                    .iter()
                    .map(|level| group.get(*level).and_then(Value::as_u64).unwrap_or(0))
                    .collect::<Vec<_>>()
            })
            .sum::<u64>() as u32;
    }

    if let Some(found) = data.get("issuesFound").and_then(Value::as_u64) {
        return found as u32;
    }

    totals.total()
}

/// Per-image status summary. Damage type substrings are checked in
/// priority order: crack, then paint, then algae/moss.
pub fn classify_finding(finding: &ImageFinding) -> FindingStatus {
    if let Some(damage) = finding.damage_type.as_deref() {
        let damage = damage.to_lowercase();
        let confidence = finding.confidence_level.clone();

        if damage.contains("crack") {
            return FindingStatus {
                text: confidence.unwrap_or_else(|| "Crack detected".to_string()),
                class: "status-crack",
            };
        }
        if damage.contains("paint") {
            return FindingStatus {
                text: confidence.unwrap_or_else(|| "Paint damage".to_string()),
                class: "status-paint",
            };
        }
        if damage.contains("algae") || damage.contains("moss") {
            return FindingStatus {
                text: confidence.unwrap_or_else(|| "Algae/Moss detected".to_string()),
                class: "status-algae",
            };
        }
    }

    FindingStatus {
        text: "No issues detected".to_string(),
        class: "status-no-issues",
    }
}

/// Badge class for a risk level, by case-insensitive substring match.
pub fn risk_badge(risk_text: &str) -> RiskBadge {
    let risk = risk_text.to_lowercase();
    if risk.contains("high") {
        RiskBadge::Danger
    } else if risk.contains("moderate") || risk.contains("medium") {
        RiskBadge::Warning
    } else if risk.contains("low") {
        RiskBadge::Success
    } else {
        RiskBadge::Neutral
    }
}

/// Render a confidence value as a rounded whole-number percentage.
/// Fractions in [0, 1] are scaled; larger values are already percentages.
pub fn confidence_percent(confidence: f64) -> u32 {
    let percent = if confidence <= 1.0 {
        confidence * 100.0
    } else {
        confidence
    };
    percent.round().max(0.0) as u32
}

/// Display filename for a submitted image: the last path segment of the
/// URI with any query string stripped, else a placeholder by position.
pub fn finding_filename(image_uri: &str, index: usize) -> String {
    let name = image_uri
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .split('?')
        .next()
        .unwrap_or_default();
    if name.is_empty() {
        return format!("IMG_{:03}.jpg", index + 1);
    }
    urlencoding::decode(name)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| name.to_string())
}

/// Flatten and deduplicate recommendations across all findings.
///
/// Entries wrapped one level under a `"0"` key are unwrapped first. Groups
/// are keyed by lowercase-trimmed title plus lowercase severity; the
/// first-seen description, actions, and severity win, and output order is
/// first-seen order.
pub fn dedup_recommendations(findings: &[ImageFinding]) -> Vec<Recommendation> {
    let mut groups: Vec<Recommendation> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for finding in findings {
        for raw in &finding.recommendations {
            let Some(entry) = unwrap_recommendation(raw) else {
                continue;
            };

            let title = text_field(entry, "title");
            let severity = text_field(entry, "severity");
            let key = format!(
                "{}|{}",
                title.trim().to_lowercase(),
                severity.to_lowercase()
            );

            match index.get(&key) {
                Some(&at) => groups[at].count += 1,
                None => {
                    index.insert(key, groups.len());
                    groups.push(Recommendation {
                        title,
                        description: text_field(entry, "description"),
                        severity,
                        actions: entry
                            .get("actions")
                            .and_then(Value::as_array)
                            .map(|actions| {
                                actions
                                    .iter()
                                    .filter_map(Value::as_str)
                                    .map(str::to_string)
                                    .collect()
                            })
                            .unwrap_or_default(),
                        count: 1,
                    });
                }
            }
        }
    }

    groups
}

/// Unwrap the legacy `{"0": {...}}` nesting if present.
fn unwrap_recommendation(raw: &Value) -> Option<&serde_json::Map<String, Value>> {
    let map = raw.as_object()?;
    if let Some(inner) = map.get("0").and_then(Value::as_object) {
        return Some(inner);
    }
    Some(map)
}

fn text_field(map: &serde_json::Map<String, Value>, key: &str) -> String {
    map.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Risk level fallback chain: `riskLevel`, `overallRisk`, then a level
/// derived from the issue count.
fn resolve_risk_level(data: &Value, issues: u32) -> String {
    if let Some(level) = data.get("riskLevel").and_then(present_text) {
        return level;
    }
    if let Some(level) = data.get("overallRisk").and_then(present_text) {
        return level;
    }
    if issues >= 5 {
        "High".to_string()
    } else if issues >= 2 {
        "Medium".to_string()
    } else {
        "Low".to_string()
    }
}

/// Display text for a risk level, avoiding "Risk Risk" duplication.
fn risk_display(level: &str) -> String {
    if level.to_lowercase().contains("risk") {
        level.to_string()
    } else {
        format!("{} Risk", level)
    }
}

/// Normalize one raw assessment document into the canonical record.
pub fn normalize(owner: &UserRecord, raw: &RawAssessment) -> AssessmentRecord {
    let data = &raw.data;

    let findings: Vec<ImageFinding> = data
        .get("assessments")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| serde_json::from_value(entry.clone()).ok())
                .collect()
        })
        .unwrap_or_default();

    let totals = issue_totals(data);
    let total_issues = total_issues(data, &totals);
    let risk_level = resolve_risk_level(data, total_issues);

    let name = data
        .get("assessmentName")
        .and_then(present_text)
        .or_else(|| data.get("buildingType").and_then(present_text))
        .unwrap_or_else(|| "Home Assessment".to_string());

    AssessmentRecord {
        id: raw.id.clone(),
        user_id: owner.user_id.clone(),
        user_name: owner.display_name().to_string(),
        name,
        timestamp: resolve_timestamp(data),
        building_type: data
            .get("buildingType")
            .and_then(present_text)
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        floors: resolve_field(data, "floors", "floors"),
        material: resolve_field(data, "material", "material"),
        foundation: resolve_field(data, "foundation", "foundation"),
        environment: data
            .get("environment")
            .and_then(present_text)
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        construction_year: data
            .get("constructionYear")
            .and_then(present_text)
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        renovation_year: data
            .get("renovationYear")
            .and_then(present_text)
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        occupancy: resolve_field(data, "occupancy", "occupancy"),
        notes: resolve_field(data, "notes", "notes"),
        previous_issues: data
            .get("previousIssues")
            .and_then(Value::as_array)
            .map(|issues| {
                issues
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
        risk_badge: risk_badge(&risk_level),
        risk_level: risk_display(&risk_level),
        total_issues,
        totals,
        findings,
    }
}
