// SPDX-License-Identifier: MIT

//! Assessment review routes.
//!
//! Assessments live under each user document, so the list page is a
//! cross-user join: every user's sub-collection is fetched and the
//! results flattened into one newest-first view.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::listing::{ListView, PageControls, PageSummary, ASSESSMENTS_PER_PAGE};
use crate::middleware::auth::AdminUser;
use crate::models::{ActivityAction, AssessmentRecord, FindingStatus, Recommendation};
use crate::services::aggregate;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/assessments", get(list_assessments))
        .route(
            "/api/assessments/{user_id}/{id}",
            get(get_assessment).delete(delete_assessment),
        )
}

#[derive(Deserialize)]
struct AssessmentsQuery {
    #[serde(default = "default_page")]
    page: usize,
    search: Option<String>,
}

fn default_page() -> usize {
    1
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentsPageResponse {
    pub assessments: Vec<AssessmentRecord>,
    pub page: usize,
    pub page_count: usize,
    pub summary: PageSummary,
    pub controls: PageControls,
}

/// All assessments across all users, newest first, 10 per page.
async fn list_assessments(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AssessmentsQuery>,
) -> Result<Json<AssessmentsPageResponse>> {
    let records: Vec<AssessmentRecord> = state
        .db
        .list_users_with_assessments()
        .await?
        .iter()
        .flat_map(|(user, raws)| raws.iter().map(|raw| aggregate::normalize(user, raw)))
        .collect();

    let mut view = ListView::new(ASSESSMENTS_PER_PAGE);
    view.load(records);

    let search = query.search.as_deref().unwrap_or("").trim().to_lowercase();
    if !search.is_empty() {
        view.set_filter(move |a: &AssessmentRecord| {
            a.user_name.to_lowercase().contains(&search)
                || a.name.to_lowercase().contains(&search)
                || a.building_type.to_lowercase().contains(&search)
        });
    }
    view.goto(query.page);

    Ok(Json(AssessmentsPageResponse {
        assessments: view.page_items().into_iter().cloned().collect(),
        page: view.current_page(),
        page_count: view.page_count(),
        summary: view.summary(),
        controls: view.controls(),
    }))
}

/// One detected issue, with confidence as a whole-number percentage.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueView {
    pub issue_type: String,
    pub level: String,
    pub confidence_percent: u32,
}

/// One submitted image with its classification and issues.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FindingView {
    pub filename: String,
    pub image_uri: String,
    pub status: FindingStatus,
    pub issues: Vec<IssueView>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentDetailResponse {
    #[serde(flatten)]
    pub record: AssessmentRecord,
    pub recommendations: Vec<Recommendation>,
    pub finding_views: Vec<FindingView>,
}

/// Full assessment detail: normalized record, deduplicated
/// recommendations, and per-image findings.
async fn get_assessment(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AdminUser>,
    Path((user_id, id)): Path<(String, String)>,
) -> Result<Json<AssessmentDetailResponse>> {
    let user = state
        .db
        .get_user(&user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

    let raw = state
        .db
        .get_assessment(&user_id, &id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Assessment {} not found", id)))?;

    let record = aggregate::normalize(&user, &raw);
    let recommendations = aggregate::dedup_recommendations(&record.findings);

    let finding_views = record
        .findings
        .iter()
        .enumerate()
        .map(|(i, finding)| FindingView {
            filename: aggregate::finding_filename(&finding.image_uri, i),
            image_uri: finding.image_uri.clone(),
            status: aggregate::classify_finding(finding),
            issues: finding
                .detected_issues
                .iter()
                .map(|issue| IssueView {
                    issue_type: issue.issue_type.clone(),
                    level: issue.level.clone(),
                    confidence_percent: aggregate::confidence_percent(issue.confidence),
                })
                .collect(),
        })
        .collect();

    state
        .recorder
        .record(
            ActivityAction::AssessmentViewed,
            &format!("Viewed assessment {} for {}", record.name, record.user_name),
            &admin.email,
        )
        .await;

    Ok(Json(AssessmentDetailResponse {
        record,
        recommendations,
        finding_views,
    }))
}

#[derive(Serialize)]
pub struct DeleteAssessmentResponse {
    pub success: bool,
}

/// Delete one assessment document.
async fn delete_assessment(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AdminUser>,
    Path((user_id, id)): Path<(String, String)>,
) -> Result<Json<DeleteAssessmentResponse>> {
    let raw = state
        .db
        .get_assessment(&user_id, &id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Assessment {} not found", id)))?;

    state.db.delete_assessment(&user_id, &id).await?;

    state
        .recorder
        .record(
            ActivityAction::AssessmentDeleted,
            &format!("Deleted assessment {}", raw.id),
            &admin.email,
        )
        .await;

    Ok(Json(DeleteAssessmentResponse { success: true }))
}
