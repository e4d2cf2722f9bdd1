// SPDX-License-Identifier: MIT

//! Transactional email delivery via the EmailJS REST API.

use crate::error::AppError;

const EMAILJS_SEND_URL: &str = "https://api.emailjs.com/api/v1.0/email/send";

/// EmailJS client bound to one service/template pair.
#[derive(Clone)]
pub struct Mailer {
    http: reqwest::Client,
    send_url: String,
    service_id: String,
    template_id: String,
    public_key: String,
}

impl Mailer {
    pub fn new(service_id: String, template_id: String, public_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            send_url: EMAILJS_SEND_URL.to_string(),
            service_id,
            template_id,
            public_key,
        }
    }

    /// Mailer against a custom endpoint, for tests.
    pub fn with_send_url(mut self, send_url: String) -> Self {
        self.send_url = send_url;
        self
    }

    /// Send a verification code email.
    ///
    /// The template interpolates `email`, `to_name`, and `code`.
    pub async fn send_verification_code(
        &self,
        email: &str,
        to_name: &str,
        code: &str,
    ) -> Result<(), AppError> {
        let body = serde_json::json!({
            "service_id": self.service_id,
            "template_id": self.template_id,
            "user_id": self.public_key,
            "template_params": {
                "email": email,
                "to_name": to_name,
                "code": code,
            },
        });

        let response = self
            .http
            .post(&self.send_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Email(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Email(format!("HTTP {}: {}", status, body)));
        }

        tracing::info!(to_name, "Verification code email sent");
        Ok(())
    }
}
