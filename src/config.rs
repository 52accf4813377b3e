use crate::errors::{AppError, AppResult};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the estimation service the client talks to
    pub api_base_url: String,
    pub http_timeout: Duration,
    /// Initial contents of the lambda field (kept as text, coerced at request time)
    pub default_lambda: String,
    pub server_host: String,
    pub server_port: u16,
    pub rate_limit_per_minute: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8000".to_string(),
            http_timeout: Duration::from_secs(10),
            default_lambda: "0.94".to_string(),
            server_host: "0.0.0.0".to_string(),
            server_port: 8000,
            rate_limit_per_minute: 5,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let http_timeout_secs = env_var_or("HTTP_TIMEOUT_SECS", "10")
            .parse::<u64>()
            .map_err(|e| AppError::Config(format!("HTTP_TIMEOUT_SECS: {e}")))?;

        let server_port = env_var_or("SERVER_PORT", "8000")
            .parse::<u16>()
            .map_err(|e| AppError::Config(format!("SERVER_PORT: {e}")))?;

        let rate_limit_per_minute = env_var_or("RATE_LIMIT_PER_MINUTE", "5")
            .parse::<u32>()
            .map_err(|e| AppError::Config(format!("RATE_LIMIT_PER_MINUTE: {e}")))?;
        if rate_limit_per_minute == 0 {
            return Err(AppError::Config("RATE_LIMIT_PER_MINUTE must be positive".into()));
        }

        Ok(Self {
            api_base_url: env_var_or("VOLSCOPE_API_URL", &defaults.api_base_url),
            http_timeout: Duration::from_secs(http_timeout_secs),
            default_lambda: env_var_or("DEFAULT_LAMBDA", &defaults.default_lambda),
            server_host: env_var_or("SERVER_HOST", &defaults.server_host),
            server_port,
            rate_limit_per_minute,
        })
    }
}

fn env_var_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
