//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// School account and class selection
    #[serde(default)]
    pub school: SchoolConfig,

    /// HTTP client behavior
    #[serde(default)]
    pub client: ClientConfig,

    /// Refresh cycle settings
    #[serde(default)]
    pub refresh: RefreshConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.school.school_id.trim().is_empty() {
            return Err(AppError::validation("school.school_id is empty"));
        }
        if self.school.username.trim().is_empty() {
            return Err(AppError::validation("school.username is empty"));
        }
        if self.client.base_url.trim().is_empty() {
            return Err(AppError::validation("client.base_url is empty"));
        }
        if self.client.user_agent.trim().is_empty() {
            return Err(AppError::validation("client.user_agent is empty"));
        }
        if self.client.timeout_secs == 0 {
            return Err(AppError::validation("client.timeout_secs must be > 0"));
        }
        if self.client.max_concurrent == 0 {
            return Err(AppError::validation("client.max_concurrent must be > 0"));
        }
        if self.refresh.interval_minutes == 0 {
            return Err(AppError::validation(
                "refresh.interval_minutes must be > 0",
            ));
        }
        if self.refresh.days == 0 {
            return Err(AppError::validation("refresh.days must be > 0"));
        }
        Ok(())
    }
}

/// Credentials and class selection for one school.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SchoolConfig {
    /// School number on stundenplan24
    #[serde(default)]
    pub school_id: String,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    /// Only process this class (all classes if unset)
    #[serde(default)]
    pub class_name: Option<String>,

    /// Subjects removed from lessons and changes
    #[serde(default)]
    pub excluded_subjects: Vec<String>,
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the schedule server
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds for schedule documents
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Maximum concurrent day fetches within one batch
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

/// Refresh cycle settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshConfig {
    /// Minutes between refreshes in watch mode
    #[serde(default = "defaults::interval_minutes")]
    pub interval_minutes: u64,

    /// Number of days fetched per refresh, starting on Monday
    #[serde(default = "defaults::days")]
    pub days: u32,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_minutes: defaults::interval_minutes(),
            days: defaults::days(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log filter ("error", "warn", "info", "debug")
    #[serde(default = "defaults::level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::level(),
        }
    }
}

mod defaults {
    // Client defaults
    pub fn base_url() -> String {
        "https://www.stundenplan24.de".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; vplan/0.1)".into()
    }
    pub fn timeout() -> u64 {
        15
    }
    pub fn max_concurrent() -> usize {
        3
    }

    // Refresh defaults
    pub fn interval_minutes() -> u64 {
        15
    }
    pub fn days() -> u32 {
        5
    }

    // Logging defaults
    pub fn level() -> String {
        "info".into()
    }
}
