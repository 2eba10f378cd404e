//! Application configuration loaded from environment variables.
//!
//! Everything is read once at startup; there are no runtime reloads.

use std::env;

/// Cloud Tasks queue that delivers reminder callbacks.
pub const REMINDER_QUEUE_NAME: &str = "pill-reminders";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Frontend URL for CORS
    pub frontend_url: String,
    /// Public URL of this service, used as the target of Cloud Tasks callbacks
    pub api_url: String,
    /// GCP project ID
    pub gcp_project_id: String,
    /// GCP region hosting the reminder queue
    pub gcp_region: String,
    /// Server port
    pub port: u16,
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// For local development the signing key can be set via `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let port = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .unwrap_or(8080);

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            api_url: env::var("API_URL")
                .unwrap_or_else(|_| format!("http://localhost:{}", port)),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            gcp_region: env::var("GCP_REGION").unwrap_or_else(|_| "us-west1".to_string()),
            port,
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
        })
    }

    /// Fixed configuration for tests; no environment access.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            api_url: "http://localhost:8080".to_string(),
            gcp_project_id: "test-project".to_string(),
            gcp_region: "us-west1".to_string(),
            port: 8080,
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
