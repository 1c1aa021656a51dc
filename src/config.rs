//! Application configuration loaded from environment variables.
//!
//! Secrets (session signing key, OpenWeather API key) are injected as
//! environment variables by the deployment and read once at startup.

use std::env;

const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";
const DEFAULT_OPENWEATHER_BASE_URL: &str = "https://api.openweathermap.org";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Frontend URL (CORS origin, cookie security)
    pub frontend_url: String,
    /// GCP project ID (Firestore)
    pub gcp_project_id: String,
    /// Firebase project ID (ID token audience)
    pub firebase_project_id: String,
    /// Server port
    pub port: u16,
    /// OpenWeather API base URL
    pub openweather_base_url: String,

    // --- Secrets ---
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// OpenWeather API key (air quality lookups are disabled without it)
    pub openweather_api_key: Option<String>,
}

impl Config {
    /// Config for tests only.
    pub fn test_default() -> Self {
        Self {
            frontend_url: DEFAULT_FRONTEND_URL.to_string(),
            gcp_project_id: "test-project".to_string(),
            firebase_project_id: "test-project".to_string(),
            port: 8080,
            openweather_base_url: DEFAULT_OPENWEATHER_BASE_URL.to_string(),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            openweather_api_key: None,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is loaded first when present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let gcp_project_id =
            env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string());

        let port = match env::var("PORT") {
            Ok(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid("PORT", raw))?,
            Err(_) => 8080,
        };

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_FRONTEND_URL.to_string()),
            firebase_project_id: env::var("FIREBASE_PROJECT_ID")
                .unwrap_or_else(|_| gcp_project_id.clone()),
            gcp_project_id,
            port,
            openweather_base_url: env::var("OPENWEATHER_BASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_OPENWEATHER_BASE_URL.to_string()),

            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            openweather_api_key: env::var("OPENWEATHER_API_KEY")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
        })
    }

    /// Whether the frontend is served over HTTPS (controls `Secure` cookies).
    pub fn is_secure_frontend(&self) -> bool {
        self.frontend_url.starts_with("https://")
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
