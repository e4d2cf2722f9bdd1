// SPDX-License-Identifier: MIT

//! Activity log and dashboard routes.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::Result;
use crate::listing::{ListView, PageControls, PageSummary, ACTIVITIES_PER_PAGE};
use crate::models::{ActivityAction, ActivityLogEntry, RawAssessment, UserRecord};
use crate::time_utils::time_ago;
use crate::AppState;

/// Dashboard shows the five most recent audit entries.
const RECENT_FEED_LEN: usize = 5;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/activity", get(list_activity))
        .route("/api/dashboard", get(dashboard))
}

/// One rendered feed entry.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityView {
    pub action: ActivityAction,
    pub title: &'static str,
    pub icon: &'static str,
    pub icon_color: &'static str,
    pub description: String,
    pub admin_email: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub time_ago: String,
}

impl ActivityView {
    fn from_entry(entry: &ActivityLogEntry, now: DateTime<Utc>) -> Self {
        Self {
            action: entry.action,
            title: entry.action.title(),
            icon: entry.action.icon(),
            icon_color: entry.action.icon_color(),
            description: entry.description.clone(),
            admin_email: entry.admin_email.clone(),
            timestamp: entry.timestamp,
            time_ago: time_ago(entry.timestamp, now),
        }
    }
}

#[derive(Deserialize)]
struct ActivityQuery {
    #[serde(default = "default_page")]
    page: usize,
    search: Option<String>,
    /// Action kind in wire form, e.g. "user_suspended"
    action: Option<String>,
}

fn default_page() -> usize {
    1
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityPageResponse {
    pub activities: Vec<ActivityView>,
    pub page: usize,
    pub page_count: usize,
    pub summary: PageSummary,
    pub controls: PageControls,
}

/// Audit log, newest first, 10 per page, filterable by text and action.
async fn list_activity(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<ActivityPageResponse>> {
    let entries = state.db.list_activities().await?;

    let mut view = ListView::new(ACTIVITIES_PER_PAGE);
    view.load(entries);

    let search = query.search.as_deref().unwrap_or("").trim().to_lowercase();
    let action: Option<ActivityAction> = query
        .action
        .as_deref()
        .and_then(|a| serde_json::from_value(serde_json::Value::String(a.to_string())).ok());
    if !search.is_empty() || action.is_some() {
        view.set_filter(move |e: &ActivityLogEntry| {
            let matches_search = search.is_empty()
                || e.description.to_lowercase().contains(&search)
                || e.admin_email.to_lowercase().contains(&search);
            let matches_action = action.is_none_or(|a| e.action == a);
            matches_search && matches_action
        });
    }
    view.goto(query.page);

    let now = Utc::now();
    Ok(Json(ActivityPageResponse {
        activities: view
            .page_items()
            .into_iter()
            .map(|e| ActivityView::from_entry(e, now))
            .collect(),
        page: view.current_page(),
        page_count: view.page_count(),
        summary: view.summary(),
        controls: view.controls(),
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub total_users: usize,
    pub active_users: usize,
    pub suspended_users: usize,
    pub total_assessments: usize,
    /// Audit entries in the last 24 hours.
    pub activities_today: usize,
    pub recent_activities: Vec<ActivityView>,
}

/// Dashboard user counters cover product users only; admin accounts
/// manage the console rather than use it.
fn user_counts(joined: &[(UserRecord, Vec<RawAssessment>)]) -> (usize, usize, usize) {
    let total = joined.iter().filter(|(u, _)| !u.is_admin).count();
    let suspended = joined
        .iter()
        .filter(|(u, _)| !u.is_admin && u.suspended())
        .count();
    (total, total - suspended, suspended)
}

/// Headline counters plus the recent-activity feed.
async fn dashboard(State(state): State<Arc<AppState>>) -> Result<Json<DashboardResponse>> {
    let joined = state.db.list_users_with_assessments().await?;
    let entries = state.db.list_activities().await?;
    let now = Utc::now();

    let (total_users, active_users, suspended_users) = user_counts(&joined);
    let total_assessments = joined.iter().map(|(_, raws)| raws.len()).sum();

    let activities_today = state
        .db
        .count_activities_since(now - Duration::hours(24))
        .await?;

    // list_activities returns newest first.
    let recent_activities = entries
        .iter()
        .take(RECENT_FEED_LEN)
        .map(|e| ActivityView::from_entry(e, now))
        .collect();

    Ok(Json(DashboardResponse {
        total_users,
        active_users,
        suspended_users,
        total_assessments,
        activities_today,
        recent_activities,
    }))
}
