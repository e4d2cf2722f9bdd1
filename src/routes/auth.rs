// SPDX-License-Identifier: MIT

//! Admin sign-in routes: password check, two-factor code verification,
//! resend, and password reset.

use axum::{
    extract::State,
    routing::post,
    Extension, Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::middleware::auth::{create_jwt, AdminUser, SESSION_COOKIE};
use crate::models::{ActivityAction, UserRecord};
use crate::services::TwoFactorService;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/verify-2fa", post(verify_2fa))
        .route("/auth/resend-code", post(resend_code))
        .route("/auth/forgot-password", post(forgot_password))
}

/// Routes that require an authenticated admin session.
pub fn session_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/logout", post(logout))
}

#[derive(Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub requires_2fa: bool,
    pub user_id: String,
    /// Session token, present only when no code verification is needed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Password sign-in.
///
/// Non-admin and suspended accounts are rejected after the password
/// check, so a valid password alone never yields a session. When the
/// 24-hour verification window has lapsed a code is emailed and the
/// client is sent to the verification step instead of given a token.
async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>)> {
    req.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let account = state
        .identity
        .sign_in_with_password(&req.email, &req.password)
        .await?;

    let user = state
        .db
        .get_user(&account.local_id)
        .await?
        .ok_or(AppError::AdminOnly)?;

    if !user.is_admin || user.suspended() {
        tracing::warn!(user_id = %user.user_id, "Non-admin sign-in rejected");
        return Err(AppError::AdminOnly);
    }

    if TwoFactorService::needs_verification(&user, chrono::Utc::now()) {
        state.two_factor.issue_code(&user).await?;
        return Ok((
            jar,
            Json(LoginResponse {
                requires_2fa: true,
                user_id: user.user_id,
                token: None,
            }),
        ));
    }

    let (jar, token) = start_session(&state, jar, &user).await?;
    Ok((
        jar,
        Json(LoginResponse {
            requires_2fa: false,
            user_id: user.user_id,
            token: Some(token),
        }),
    ))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    pub user_id: String,
    pub code: String,
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub token: String,
}

/// Check the emailed code and open a session.
async fn verify_2fa(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<VerifyRequest>,
) -> Result<(CookieJar, Json<SessionResponse>)> {
    let code = req.code.trim();
    if code.len() != 6 || !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::BadRequest(
            "Verification code must be 6 digits".into(),
        ));
    }

    state.two_factor.verify_code(&req.user_id, code).await?;

    let user = state
        .db
        .get_user(&req.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    state
        .recorder
        .record(
            ActivityAction::TwoFaVerified,
            "Completed two-factor verification",
            &user.email,
        )
        .await;

    let (jar, token) = start_session(&state, jar, &user).await?;
    Ok((jar, Json(SessionResponse { token })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResendRequest {
    pub user_id: String,
}

#[derive(Serialize)]
pub struct OkResponse {
    pub success: bool,
    pub message: String,
}

/// Email a fresh code, superseding the previous one.
async fn resend_code(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResendRequest>,
) -> Result<Json<OkResponse>> {
    let user = state
        .db
        .get_user(&req.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    if !user.is_admin {
        return Err(AppError::AdminOnly);
    }

    state.two_factor.issue_code(&user).await?;

    Ok(Json(OkResponse {
        success: true,
        message: "A new verification code has been sent".to_string(),
    }))
}

#[derive(Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
}

/// Send a password reset email, for admin accounts only.
async fn forgot_password(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<Json<OkResponse>> {
    req.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let email = req.email.trim().to_lowercase();
    let is_admin = state
        .db
        .list_users()
        .await?
        .iter()
        .any(|u| u.is_admin && u.email.to_lowercase() == email);

    if !is_admin {
        return Err(AppError::BadRequest(
            "This email is not registered as an admin account".into(),
        ));
    }

    state.identity.send_password_reset(&email).await?;

    Ok(Json(OkResponse {
        success: true,
        message: "Password reset email sent".to_string(),
    }))
}

/// Close the session and record the sign-out.
async fn logout(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AdminUser>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<OkResponse>)> {
    state
        .recorder
        .record(ActivityAction::Logout, "Signed out", &admin.email)
        .await;

    let jar = jar.remove(Cookie::from(SESSION_COOKIE));
    Ok((
        jar,
        Json(OkResponse {
            success: true,
            message: "Signed out".to_string(),
        }),
    ))
}

/// Mint a session JWT, set the cookie, and record the sign-in.
async fn start_session(
    state: &Arc<AppState>,
    jar: CookieJar,
    user: &UserRecord,
) -> Result<(CookieJar, String)> {
    let token = create_jwt(&user.user_id, &state.config.jwt_signing_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;

    state
        .recorder
        .record(ActivityAction::Login, "Signed in", &user.email)
        .await;

    let cookie = Cookie::build((SESSION_COOKIE, token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.config.frontend_url.starts_with("https"))
        .build();

    Ok((jar.add(cookie), token))
}
