// SPDX-License-Identifier: MIT

//! Identity provider REST client.
//!
//! Credential operations (sign-in, account creation, password reset
//! emails, email/password updates) go through the Google Identity Toolkit
//! REST API. Account creation happens entirely server-side, so issuing a
//! session for the new account never disturbs the admin's own session.

use crate::error::AppError;
use serde::Deserialize;

/// Identity Toolkit client.
#[derive(Clone)]
pub struct IdentityClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl IdentityClient {
    pub fn new(api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: "https://identitytoolkit.googleapis.com/v1".to_string(),
            api_key,
        }
    }

    /// Client against a custom endpoint, for tests and the auth emulator.
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            api_key,
        }
    }

    /// Verify an email/password pair and return the account.
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<IdentityAccount, AppError> {
        let body = serde_json::json!({
            "email": email,
            "password": password,
            "returnSecureToken": true,
        });
        self.post_json("accounts:signInWithPassword", &body).await
    }

    /// Create a new account and return it, including an ID token usable
    /// for a compensating delete if follow-up writes fail.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<IdentityAccount, AppError> {
        let body = serde_json::json!({
            "email": email,
            "password": password,
            "returnSecureToken": true,
        });
        self.post_json("accounts:signUp", &body).await
    }

    /// Delete the account identified by the given ID token.
    pub async fn delete_account(&self, id_token: &str) -> Result<(), AppError> {
        let body = serde_json::json!({ "idToken": id_token });
        let _: serde_json::Value = self.post_json("accounts:delete", &body).await?;
        Ok(())
    }

    /// Send a password reset email.
    pub async fn send_password_reset(&self, email: &str) -> Result<(), AppError> {
        let body = serde_json::json!({
            "requestType": "PASSWORD_RESET",
            "email": email,
        });
        let _: serde_json::Value = self.post_json("accounts:sendOobCode", &body).await?;
        Ok(())
    }

    /// Change the email on the account identified by the ID token.
    pub async fn update_email(
        &self,
        id_token: &str,
        new_email: &str,
    ) -> Result<IdentityAccount, AppError> {
        let body = serde_json::json!({
            "idToken": id_token,
            "email": new_email,
            "returnSecureToken": true,
        });
        self.post_json("accounts:update", &body).await
    }

    /// Change the password on the account identified by the ID token.
    pub async fn update_password(
        &self,
        id_token: &str,
        new_password: &str,
    ) -> Result<IdentityAccount, AppError> {
        let body = serde_json::json!({
            "idToken": id_token,
            "password": new_password,
            "returnSecureToken": true,
        });
        self.post_json("accounts:update", &body).await
    }

    async fn post_json<T: for<'de> Deserialize<'de>>(
        &self,
        method: &str,
        body: &serde_json::Value,
    ) -> Result<T, AppError> {
        let url = format!("{}/{}?key={}", self.base_url, method, self.api_key);

        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::Identity(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(identity_error(status, &body));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Identity(format!("JSON parse error: {}", e)))
    }
}

/// Map an Identity Toolkit error body onto our error taxonomy.
///
/// Bad credentials become 401s so the login flow can't distinguish a wrong
/// password from a missing account; everything else surfaces as an
/// upstream failure.
fn identity_error(status: reqwest::StatusCode, body: &str) -> AppError {
    let code = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")?
                .get("message")?
                .as_str()
                .map(str::to_string)
        })
        .unwrap_or_default();

    match code.split(' ').next().unwrap_or_default() {
        "INVALID_PASSWORD" | "EMAIL_NOT_FOUND" | "INVALID_LOGIN_CREDENTIALS" | "USER_DISABLED"
        | "INVALID_ID_TOKEN" | "CREDENTIAL_TOO_OLD_LOGIN_AGAIN" => AppError::Unauthorized,
        "EMAIL_EXISTS" => AppError::BadRequest("An account with this email already exists".into()),
        "WEAK_PASSWORD" => AppError::BadRequest("Password is too weak".into()),
        _ if code.is_empty() => AppError::Identity(format!("HTTP {}: {}", status, body)),
        _ => AppError::Identity(code),
    }
}

/// Account data returned by sign-in, sign-up, and update calls.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityAccount {
    /// The account UID.
    pub local_id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub id_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_errors_map_to_unauthorized() {
        let body = r#"{"error":{"message":"INVALID_LOGIN_CREDENTIALS"}}"#;
        let err = identity_error(reqwest::StatusCode::BAD_REQUEST, body);
        assert!(matches!(err, AppError::Unauthorized));

        // Suffixed variants like "WEAK_PASSWORD : ..." still match.
        let body = r#"{"error":{"message":"WEAK_PASSWORD : Password should be at least 6 characters"}}"#;
        let err = identity_error(reqwest::StatusCode::BAD_REQUEST, body);
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_unknown_errors_surface_as_upstream() {
        let err = identity_error(reqwest::StatusCode::INTERNAL_SERVER_ERROR, "oops");
        assert!(matches!(err, AppError::Identity(_)));

        let body = r#"{"error":{"message":"QUOTA_EXCEEDED"}}"#;
        let err = identity_error(reqwest::StatusCode::BAD_REQUEST, body);
        match err {
            AppError::Identity(msg) => assert_eq!(msg, "QUOTA_EXCEEDED"),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
