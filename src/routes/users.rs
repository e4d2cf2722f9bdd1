// SPDX-License-Identifier: MIT

//! User management routes.

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::listing::{ListView, PageControls, PageSummary, ASSESSMENTS_PER_PAGE, USERS_PER_PAGE};
use crate::middleware::auth::AdminUser;
use crate::models::{ActivityAction, AssessmentRecord, RiskBadge, UserRecord};
use crate::services::aggregate;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/users", get(list_users).post(create_user))
        .route(
            "/api/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/api/users/{id}/suspend", post(suspend_user))
        .route("/api/users/{id}/unsuspend", post(unsuspend_user))
}

// ─── Listing ─────────────────────────────────────────────────

#[derive(Deserialize)]
struct UsersQuery {
    #[serde(default = "default_page")]
    page: usize,
    search: Option<String>,
    /// "active" or "suspended"
    status: Option<String>,
}

fn default_page() -> usize {
    1
}

/// One row on the users page.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub user_id: String,
    pub full_name: String,
    pub email: String,
    pub role: String,
    pub status: &'static str,
    pub photo_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl UserSummary {
    fn from_record(user: &UserRecord) -> Self {
        Self {
            user_id: user.user_id.clone(),
            full_name: user.full_name.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
            status: if user.suspended() {
                "suspended"
            } else {
                "active"
            },
            photo_url: user.photo().map(str::to_string),
            created_at: user.created_at,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total: usize,
    pub active: usize,
    pub suspended: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsersPageResponse {
    pub users: Vec<UserSummary>,
    pub page: usize,
    pub page_count: usize,
    pub summary: PageSummary,
    pub controls: PageControls,
    pub stats: UserStats,
}

/// List users, newest first, 6 per page, with search and status filter.
async fn list_users(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UsersQuery>,
) -> Result<Json<UsersPageResponse>> {
    let records = state.db.list_users().await?;

    // Headline counters cover the whole set, not the filtered page.
    let suspended = records.iter().filter(|u| u.suspended()).count();
    let stats = UserStats {
        total: records.len(),
        active: records.len() - suspended,
        suspended,
    };

    let mut view = ListView::new(USERS_PER_PAGE);
    view.load(records);

    let search = query.search.as_deref().unwrap_or("").trim().to_lowercase();
    let status = query.status.clone();
    if !search.is_empty() || status.is_some() {
        view.set_filter(move |u: &UserRecord| {
            let matches_search = search.is_empty()
                || u.full_name.to_lowercase().contains(&search)
                || u.email.to_lowercase().contains(&search);
            let matches_status = match status.as_deref() {
                Some("suspended") => u.suspended(),
                Some("active") => !u.suspended(),
                _ => true,
            };
            matches_search && matches_status
        });
    }
    view.goto(query.page);

    Ok(Json(UsersPageResponse {
        users: view
            .page_items()
            .into_iter()
            .map(UserSummary::from_record)
            .collect(),
        page: view.current_page(),
        page_count: view.page_count(),
        summary: view.summary(),
        controls: view.controls(),
        stats,
    }))
}

// ─── Detail ──────────────────────────────────────────────────

#[derive(Deserialize)]
struct DetailQuery {
    #[serde(default = "default_page")]
    page: usize,
}

/// Abbreviated assessment row for the user-detail page.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentSummary {
    pub id: String,
    pub name: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub risk_level: String,
    pub risk_badge: RiskBadge,
    pub total_issues: u32,
}

impl AssessmentSummary {
    fn from_record(record: &AssessmentRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            timestamp: record.timestamp,
            risk_level: record.risk_level.clone(),
            risk_badge: record.risk_badge,
            total_issues: record.total_issues,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetailResponse {
    pub user: UserRecord,
    pub assessments: Vec<AssessmentSummary>,
    pub page: usize,
    pub page_count: usize,
    pub summary: PageSummary,
    pub controls: PageControls,
}

/// User profile plus their assessments, paged 10 at a time.
async fn get_user(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AdminUser>,
    Path(id): Path<String>,
    Query(query): Query<DetailQuery>,
) -> Result<Json<UserDetailResponse>> {
    let user = state
        .db
        .get_user(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))?;

    let records: Vec<AssessmentRecord> = state
        .db
        .list_assessments_for_user(&id)
        .await?
        .iter()
        .map(|raw| aggregate::normalize(&user, raw))
        .collect();

    let mut view = ListView::new(ASSESSMENTS_PER_PAGE);
    view.load(records);
    view.goto(query.page);

    state
        .recorder
        .record(
            ActivityAction::UserViewed,
            &format!("Viewed user details for {}", user.display_name()),
            &admin.email,
        )
        .await;

    Ok(Json(UserDetailResponse {
        assessments: view
            .page_items()
            .into_iter()
            .map(AssessmentSummary::from_record)
            .collect(),
        page: view.current_page(),
        page_count: view.page_count(),
        summary: view.summary(),
        controls: view.controls(),
        user,
    }))
}

// ─── Creation ────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(length(min = 1, message = "Full name is required"))]
    pub full_name: String,
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    pub confirm_password: String,
    #[validate(length(min = 1, message = "Role is required"))]
    pub role: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserResponse {
    pub user_id: String,
}

/// Create a user account plus its profile document.
///
/// If the profile write fails after the account exists, the account is
/// deleted again so no orphaned credential is left able to sign in
/// without a profile.
async fn create_user(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AdminUser>,
    Json(req): Json<CreateUserRequest>,
) -> Result<Json<CreateUserResponse>> {
    req.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    if req.password != req.confirm_password {
        return Err(AppError::BadRequest("Passwords do not match".into()));
    }

    let account = state.identity.sign_up(&req.email, &req.password).await?;

    let user = UserRecord::new(
        account.local_id.clone(),
        req.full_name.trim().to_string(),
        req.email.trim().to_string(),
        req.role,
    );

    if let Err(e) = state.db.upsert_user(&user).await {
        tracing::error!(user_id = %account.local_id, error = %e, "Profile write failed, rolling back account");
        if let Err(del) = state.identity.delete_account(&account.id_token).await {
            tracing::error!(user_id = %account.local_id, error = %del, "Rollback delete failed, orphaned account remains");
        }
        return Err(e);
    }

    state
        .recorder
        .record(
            ActivityAction::UserCreated,
            &format!("Created user account for {}", user.display_name()),
            &admin.email,
        )
        .await;

    Ok(Json(CreateUserResponse {
        user_id: account.local_id,
    }))
}

// ─── Updates ─────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub full_name: Option<String>,
    pub role: Option<String>,
    pub admin_notes: Option<String>,
}

/// Edit profile fields. Fetch-modify-write so untouched fields survive.
async fn update_user(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AdminUser>,
    Path(id): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<UserRecord>> {
    let mut user = state
        .db
        .get_user(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))?;

    if let Some(name) = req.full_name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::BadRequest("Full name cannot be empty".into()));
        }
        user.full_name = name;
    }
    if let Some(role) = req.role {
        user.role = role;
    }
    if let Some(notes) = req.admin_notes {
        user.admin_notes = Some(notes);
    }
    user.updated_at = Some(Utc::now());

    state.db.upsert_user(&user).await?;

    state
        .recorder
        .record(
            ActivityAction::UserUpdated,
            &format!("Updated user details for {}", user.display_name()),
            &admin.email,
        )
        .await;

    Ok(Json(user))
}

/// Optional reason supplied with a suspend/unsuspend action; recorded
/// in the audit log, never stored on the profile.
#[derive(Deserialize, Default)]
pub struct SuspendRequest {
    pub reason: Option<String>,
}

/// Suspend an account. Both status fields and the suspension timestamp
/// are written together.
async fn suspend_user(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AdminUser>,
    Path(id): Path<String>,
    body: Option<Json<SuspendRequest>>,
) -> Result<Json<UserRecord>> {
    set_suspension(&state, &admin, &id, true, body).await
}

/// Reinstate a suspended account.
async fn unsuspend_user(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AdminUser>,
    Path(id): Path<String>,
    body: Option<Json<SuspendRequest>>,
) -> Result<Json<UserRecord>> {
    set_suspension(&state, &admin, &id, false, body).await
}

fn suspension_description(suspended: bool, name: &str, reason: Option<&str>) -> String {
    let verb = if suspended { "Suspended" } else { "Unsuspended" };
    match reason.map(str::trim).filter(|r| !r.is_empty()) {
        Some(reason) => format!("{} account for {}. Reason: {}", verb, name, reason),
        None => format!("{} account for {}", verb, name),
    }
}

async fn set_suspension(
    state: &Arc<AppState>,
    admin: &AdminUser,
    id: &str,
    suspended: bool,
    body: Option<Json<SuspendRequest>>,
) -> Result<Json<UserRecord>> {
    if admin.user_id == id {
        return Err(AppError::BadRequest(
            "You cannot suspend your own account".into(),
        ));
    }

    let mut user = state
        .db
        .get_user(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))?;

    user.set_suspended(suspended, Utc::now());
    state.db.upsert_user(&user).await?;

    let action = if suspended {
        ActivityAction::UserSuspended
    } else {
        ActivityAction::UserUnsuspended
    };
    let reason = body.and_then(|Json(b)| b.reason);
    state
        .recorder
        .record(
            action,
            &suspension_description(suspended, user.display_name(), reason.as_deref()),
            &admin.email,
        )
        .await;

    Ok(Json(user))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteUserResponse {
    pub deleted_documents: usize,
}

/// Delete a user's profile, assessments, and verification code.
///
/// The credential record at the identity provider is not touched: the
/// admin REST surface cannot delete another account's credential, and a
/// credential without a profile cannot pass the admin gate anyway.
async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AdminUser>,
    Path(id): Path<String>,
) -> Result<Json<DeleteUserResponse>> {
    if admin.user_id == id {
        return Err(AppError::BadRequest(
            "You cannot delete your own account".into(),
        ));
    }

    let user = state
        .db
        .get_user(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))?;
    let name = user.display_name().to_string();

    let deleted = state.db.delete_user_data(&id).await?;

    state
        .recorder
        .record(
            ActivityAction::UserDeleted,
            &format!("Deleted user account for {}", name),
            &admin.email,
        )
        .await;

    Ok(Json(DeleteUserResponse {
        deleted_documents: deleted,
    }))
}
