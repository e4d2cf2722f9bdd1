//! Two-factor verification code model.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Codes are valid for 5 minutes.
pub const CODE_TTL_MINUTES: i64 = 5;

/// Single-slot verification code stored at `verificationCodes/{uid}`.
///
/// Superseded on resend, deleted on successful use.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationCode {
    pub code: String,
    #[serde(with = "firestore::serialize_as_timestamp")]
    pub expires_at: DateTime<Utc>,
    #[serde(default, with = "firestore::serialize_as_optional_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl VerificationCode {
    pub fn new(code: String, now: DateTime<Utc>) -> Self {
        Self {
            code,
            expires_at: now + Duration::minutes(CODE_TTL_MINUTES),
            created_at: Some(now),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_window() {
        let now = Utc::now();
        let code = VerificationCode::new("123456".into(), now);

        assert!(!code.is_expired(now));
        assert!(!code.is_expired(now + Duration::minutes(5)));
        assert!(code.is_expired(now + Duration::minutes(5) + Duration::seconds(1)));
    }
}
