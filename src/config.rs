//! Application configuration loaded from environment variables.
//!
//! All values are read once at startup. For local development a `.env`
//! file is supported; in production the deployment injects env vars.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Frontend URL for CORS and redirects
    pub frontend_url: String,
    /// GCP project ID (Firestore)
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Identity provider web API key (public)
    pub identity_api_key: String,
    /// Transactional email service ID
    pub email_service_id: String,
    /// Transactional email template ID for 2FA codes
    pub email_template_id: String,
    /// Transactional email public key
    pub email_public_key: String,

    // --- Secrets ---
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            identity_api_key: env::var("IDENTITY_API_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("IDENTITY_API_KEY"))?,
            email_service_id: env::var("EMAIL_SERVICE_ID")
                .map_err(|_| ConfigError::Missing("EMAIL_SERVICE_ID"))?,
            email_template_id: env::var("EMAIL_TEMPLATE_ID")
                .map_err(|_| ConfigError::Missing("EMAIL_TEMPLATE_ID"))?,
            email_public_key: env::var("EMAIL_PUBLIC_KEY")
                .map_err(|_| ConfigError::Missing("EMAIL_PUBLIC_KEY"))?,
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
        })
    }

    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            identity_api_key: "test_api_key".to_string(),
            email_service_id: "service_test".to_string(),
            email_template_id: "template_test".to_string(),
            email_public_key: "public_test".to_string(),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        env::set_var("IDENTITY_API_KEY", "test_key");
        env::set_var("EMAIL_SERVICE_ID", "service_x");
        env::set_var("EMAIL_TEMPLATE_ID", "template_x");
        env::set_var("EMAIL_PUBLIC_KEY", "public_x");
        env::set_var("JWT_SIGNING_KEY", "test_jwt_key_32_bytes_minimum!!");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.identity_api_key, "test_key");
        assert_eq!(config.email_service_id, "service_x");
        assert_eq!(config.port, 8080);
    }
}
