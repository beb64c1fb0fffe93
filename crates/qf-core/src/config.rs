//! Filter configuration
//!
//! Holds the package- and application-level timezone defaults consulted
//! when a compiler call passes no explicit timezone. Resolution order is
//! fixed: explicit argument, then `timezone`, then `app_timezone`, then
//! UTC.

use serde::{Deserialize, Serialize};

/// Environment variable for the package-level timezone
pub const TIMEZONE_ENV: &str = "QUERY_FILTER_TIMEZONE";

/// Environment variable for the application-level fallback timezone
pub const APP_TIMEZONE_ENV: &str = "APP_TIMEZONE";

/// Configuration for filter compilation
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FilterConfig {
    /// Package-level timezone for date filters (e.g. "Africa/Lagos")
    pub timezone: Option<String>,

    /// Application-level fallback timezone
    pub app_timezone: Option<String>,
}

impl FilterConfig {
    /// Configuration with no overrides; date filters resolve to UTC
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the package-level timezone
    pub fn with_timezone(mut self, tz: impl Into<String>) -> Self {
        self.timezone = Some(tz.into());
        self
    }

    /// Set the application-level fallback timezone
    pub fn with_app_timezone(mut self, tz: impl Into<String>) -> Self {
        self.app_timezone = Some(tz.into());
        self
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(tz) = std::env::var(TIMEZONE_ENV) {
            if !tz.is_empty() {
                config.timezone = Some(tz);
            }
        }
        if let Ok(tz) = std::env::var(APP_TIMEZONE_ENV) {
            if !tz.is_empty() {
                config.app_timezone = Some(tz);
            }
        }

        config
    }
}
