// SPDX-License-Identifier: MIT

//! Admin profile routes: view, edit, and password change.

use axum::{
    extract::State,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::middleware::auth::AdminUser;
use crate::models::{ActivityAction, UserRecord};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/profile", get(get_profile).put(update_profile))
        .route("/api/profile/password", post(change_password))
}

/// The signed-in admin's own profile.
async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AdminUser>,
) -> Result<Json<UserRecord>> {
    state
        .db
        .get_user(&admin.user_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Profile not found".into()))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub full_name: Option<String>,
    pub photo_url: Option<String>,
    /// New email address. Requires `current_password` for reauthentication.
    pub email: Option<String>,
    pub current_password: Option<String>,
}

/// Edit the admin's own profile.
///
/// Email changes go through the identity provider first, reauthenticated
/// with the current password; the profile document is only updated once
/// the provider accepts the new address.
async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AdminUser>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<UserRecord>> {
    let mut user = state
        .db
        .get_user(&admin.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".into()))?;

    if let Some(new_email) = req.email.as_deref() {
        let new_email = new_email.trim();
        if new_email != user.email {
            let password = req.current_password.as_deref().ok_or_else(|| {
                AppError::BadRequest("Current password is required to change email".into())
            })?;

            let account = state
                .identity
                .sign_in_with_password(&user.email, password)
                .await?;
            state
                .identity
                .update_email(&account.id_token, new_email)
                .await?;

            user.email = new_email.to_string();
        }
    }

    if let Some(name) = req.full_name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::BadRequest("Full name cannot be empty".into()));
        }
        user.full_name = name;
    }
    if let Some(photo) = req.photo_url {
        user.photo_url = Some(photo);
    }
    user.updated_at = Some(Utc::now());

    state.db.upsert_user(&user).await?;

    state
        .recorder
        .record(
            ActivityAction::ProfileUpdated,
            "Updated profile details",
            &user.email,
        )
        .await;

    Ok(Json(user))
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

#[derive(Serialize)]
pub struct ChangePasswordResponse {
    pub success: bool,
}

/// Change the admin's password after reauthenticating with the current one.
async fn change_password(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AdminUser>,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<ChangePasswordResponse>> {
    req.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    validate_password_strength(&req.new_password)?;
    if req.new_password != req.confirm_password {
        return Err(AppError::BadRequest("Passwords do not match".into()));
    }

    let account = state
        .identity
        .sign_in_with_password(&admin.email, &req.current_password)
        .await?;
    state
        .identity
        .update_password(&account.id_token, &req.new_password)
        .await?;

    state
        .recorder
        .record(ActivityAction::PasswordChanged, "Changed password", &admin.email)
        .await;

    Ok(Json(ChangePasswordResponse { success: true }))
}

/// At least 8 characters with upper case, lower case, a digit, and a
/// special character.
fn validate_password_strength(password: &str) -> Result<()> {
    let long_enough = password.len() >= 8;
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| !c.is_ascii_alphanumeric());

    if long_enough && has_upper && has_lower && has_digit && has_special {
        Ok(())
    } else {
        Err(AppError::BadRequest(
            "Password must be at least 8 characters and include upper case, \
             lower case, a number, and a special character"
                .into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_strength_policy() {
        assert!(validate_password_strength("Str0ng!pass").is_ok());

        assert!(validate_password_strength("Ab1!").is_err()); // too short
        assert!(validate_password_strength("alllower1!").is_err()); // no upper
        assert!(validate_password_strength("ALLUPPER1!").is_err()); // no lower
        assert!(validate_password_strength("NoDigits!!").is_err());
        assert!(validate_password_strength("NoSpecial1A").is_err());
    }
}
