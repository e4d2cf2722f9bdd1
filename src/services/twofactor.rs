// SPDX-License-Identifier: MIT

//! Two-factor verification flow.
//!
//! Sign-in issues a 6-digit code stored at `verificationCodes/{uid}` and
//! emailed to the admin. Codes live for 5 minutes and are single-use;
//! verification deletes the document and stamps `last2FAVerification` on
//! the profile. A verification is good for 24 hours.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::{UserRecord, VerificationCode};
use crate::services::Mailer;

/// Verification lasts this long before sign-in requires a fresh code.
pub const REVERIFICATION_HOURS: i64 = 24;

#[derive(Clone)]
pub struct TwoFactorService {
    db: FirestoreDb,
    mailer: Mailer,
}

impl TwoFactorService {
    pub fn new(db: FirestoreDb, mailer: Mailer) -> Self {
        Self { db, mailer }
    }

    /// Whether the admin must verify a code before this sign-in completes.
    pub fn needs_verification(user: &UserRecord, now: DateTime<Utc>) -> bool {
        match user.last_2fa_verification {
            Some(last) => now - last >= Duration::hours(REVERIFICATION_HOURS),
            None => true,
        }
    }

    /// Generate a fresh code, store it, and email it. Any previous code
    /// for the user is superseded.
    pub async fn issue_code(&self, user: &UserRecord) -> Result<()> {
        let code = generate_code();
        let record = VerificationCode::new(code.clone(), Utc::now());
        self.db.set_verification_code(&user.user_id, &record).await?;

        self.mailer
            .send_verification_code(&user.email, user.display_name(), &code)
            .await?;

        tracing::info!(user_id = %user.user_id, "Verification code issued");
        Ok(())
    }

    /// Check a submitted code.
    ///
    /// Expired codes are deleted and report expiry distinctly from a
    /// mismatch, so the client can prompt for a resend rather than a
    /// retype. A correct code is consumed and the profile's
    /// `last2FAVerification` stamped.
    pub async fn verify_code(&self, user_id: &str, submitted: &str) -> Result<()> {
        let stored = self
            .db
            .get_verification_code(user_id)
            .await?
            .ok_or_else(|| {
                AppError::BadRequest("No verification code found. Please request a new code.".into())
            })?;

        if stored.is_expired(Utc::now()) {
            self.db.delete_verification_code(user_id).await?;
            return Err(AppError::CodeExpired);
        }

        if stored.code != submitted.trim() {
            return Err(AppError::CodeMismatch);
        }

        self.db.delete_verification_code(user_id).await?;

        let mut user = self
            .db
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;
        user.last_2fa_verification = Some(Utc::now());
        self.db.upsert_user(&user).await?;

        tracing::info!(user_id, "Two-factor verification completed");
        Ok(())
    }
}

/// Random 6-digit code, zero-padding excluded by construction.
fn generate_code() -> String {
    rand::rng().random_range(100_000..1_000_000).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_codes_are_six_digits() {
        for _ in 0..100 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
            assert_ne!(code.chars().next(), Some('0'));
        }
    }

    #[test]
    fn test_needs_verification_24_hour_window() {
        let now = Utc::now();
        let mut user = UserRecord::new(
            "uid-1".into(),
            "Jane Roe".into(),
            "jane@example.com".into(),
            "Admin".into(),
        );

        assert!(TwoFactorService::needs_verification(&user, now));

        user.last_2fa_verification = Some(now - Duration::hours(23));
        assert!(!TwoFactorService::needs_verification(&user, now));

        user.last_2fa_verification = Some(now - Duration::hours(24));
        assert!(TwoFactorService::needs_verification(&user, now));
    }
}
