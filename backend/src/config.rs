//! Application configuration loaded from environment variables.

use crate::error::{AppError, Result};
use std::env;

/// Application configuration
#[derive(Clone)]
pub struct Config {
    /// Database connection URL
    pub database_url: String,

    /// Server bind address (host:port)
    pub bind_address: String,

    /// Log level
    pub log_level: String,

    /// Seconds between two periodic retention sweeps
    pub retention_interval_secs: u64,

    /// Run one retention sweep immediately at startup
    pub retention_run_on_start: bool,

    /// Expose the manual retention trigger and run date override
    pub enable_test_endpoints: bool,
}

redacted_debug!(Config {
    redact database_url,
    show bind_address,
    show log_level,
    show retention_interval_secs,
    show retention_run_on_start,
    show enable_test_endpoints,
});

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| AppError::Config("DATABASE_URL not set".into()))?,
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            retention_interval_secs: env::var("RETENTION_INTERVAL_SECS")
                .unwrap_or_else(|_| "3600".into())
                .parse()
                .unwrap_or(3600),
            retention_run_on_start: parse_bool(env::var("RETENTION_RUN_ON_START").ok(), true),
            enable_test_endpoints: parse_bool(env::var("ENABLE_TEST_ENDPOINTS").ok(), false),
        })
    }
}

/// Interpret common truthy/falsy spellings, falling back to `default`.
fn parse_bool(value: Option<String>, default: bool) -> bool {
    match value.as_deref().map(|v| v.trim().to_ascii_lowercase()) {
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => true,
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => false,
        _ => default,
    }
}
