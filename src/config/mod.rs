use std::env;
use std::time::Duration;

use crate::services::dashboard::DashboardSettings;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_token_expiry_secs: i64,
    pub sign_in_path: String,
    pub denial_redirect_delay_ms: u64,
    pub frontend_url: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")?,
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
            host: env::var("BACKEND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("BACKEND_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            jwt_secret: env::var("JWT_SECRET")?,
            jwt_token_expiry_secs: env::var("JWT_TOKEN_EXPIRY_SECS")
                .unwrap_or_else(|_| "3600".to_string())
                .parse()
                .unwrap_or(3600),
            sign_in_path: env::var("SIGN_IN_PATH").unwrap_or_else(|_| "login.html".to_string()),
            denial_redirect_delay_ms: env::var("DENIAL_REDIRECT_DELAY_MS")
                .unwrap_or_else(|_| "1200".to_string())
                .parse()
                .unwrap_or(1200),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
        })
    }

    /// Controller settings derived from this configuration.
    pub fn dashboard_settings(&self) -> DashboardSettings {
        DashboardSettings {
            sign_in_path: self.sign_in_path.clone(),
            denial_redirect_delay: Duration::from_millis(self.denial_redirect_delay_ms),
            ..DashboardSettings::default()
        }
    }
}
