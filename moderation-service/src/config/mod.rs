use crate::error::ModerationError;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    // Server configuration
    pub http_port: u16,

    // Ban policy configuration
    pub timeout_window_hours: i64,

    // Expired-ban reaper
    pub reaper_enabled: bool,
    pub reaper_interval_secs: u64,

    // Service configuration
    pub service_name: String,
    pub environment: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ModerationError> {
        dotenv::dotenv().ok();

        let config = Self {
            http_port: env::var("HTTP_PORT")
                .unwrap_or_else(|_| "8087".to_string())
                .parse()
                .unwrap_or(8087),
            timeout_window_hours: env::var("TIMEOUT_WINDOW_HOURS")
                .unwrap_or_else(|_| "24".to_string())
                .parse()
                .unwrap_or(24),
            reaper_enabled: env::var("BAN_REAPER_ENABLED")
                .map(|v| v == "true")
                .unwrap_or(true),
            reaper_interval_secs: env::var("BAN_REAPER_INTERVAL_SECS")
                .unwrap_or_else(|_| "300".to_string())
                .parse()
                .unwrap_or(300),
            service_name: env::var("SERVICE_NAME")
                .unwrap_or_else(|_| "moderation-service".to_string()),
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        };

        if config.timeout_window_hours <= 0 {
            return Err(ModerationError::Config(
                "TIMEOUT_WINDOW_HOURS must be positive".into(),
            ));
        }
        if config.reaper_interval_secs == 0 {
            return Err(ModerationError::Config(
                "BAN_REAPER_INTERVAL_SECS must be positive".into(),
            ));
        }

        Ok(config)
    }
}
