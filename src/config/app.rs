use anyhow::Result;
use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub log_level: String,
    pub jwt_secret: String,
    pub upload_dir: String,
    pub scheduler_enabled: bool,
    /// How far ahead the nightly job materializes training sessions.
    pub session_horizon_days: i64,
    pub absence_alert_threshold: i64,
    pub absence_alert_window_days: i64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .unwrap_or(3000);
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let jwt_secret = env::var("JWT_SECRET")
            .unwrap_or_else(|_| "your-secret-key-change-in-production".to_string());
        let upload_dir = env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string());
        let scheduler_enabled = env::var("SCHEDULER_ENABLED")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(true);
        let session_horizon_days = env::var("SESSION_HORIZON_DAYS")
            .unwrap_or_else(|_| "60".to_string())
            .parse()
            .unwrap_or(60);
        let absence_alert_threshold = env::var("ABSENCE_ALERT_THRESHOLD")
            .unwrap_or_else(|_| "3".to_string())
            .parse()
            .unwrap_or(3);
        let absence_alert_window_days = env::var("ABSENCE_ALERT_WINDOW_DAYS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .unwrap_or(30);

        Ok(AppConfig {
            host,
            port,
            environment,
            log_level,
            jwt_secret,
            upload_dir,
            scheduler_enabled,
            session_horizon_days,
            absence_alert_threshold,
            absence_alert_window_days,
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
