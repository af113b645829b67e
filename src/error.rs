// src/error.rs

//! Unified error handling for the schedule pipeline.

use thiserror::Error;

/// Result type alias for schedule operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed (transport error or timeout)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Schedule document is not well-formed XML
    #[error("XML parse error: {0}")]
    Xml(#[from] roxmltree::Error),

    /// Server answered with a non-success status
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    /// Credentials were rejected by the schedule server
    #[error("Authentication rejected (HTTP {status})")]
    Unauthorized { status: u16 },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Map a non-success HTTP status to the matching error.
    pub fn from_status(url: impl Into<String>, status: u16) -> Self {
        match status {
            401 | 403 => Self::Unauthorized { status },
            _ => Self::Status {
                url: url.into(),
                status,
            },
        }
    }

    /// Whether this error means the whole source is unusable, not just one day.
    pub fn is_systemic(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_classifies_auth_failures() {
        assert!(AppError::from_status("u", 401).is_systemic());
        assert!(AppError::from_status("u", 403).is_systemic());
        assert!(!AppError::from_status("u", 404).is_systemic());
        assert!(!AppError::from_status("u", 500).is_systemic());
    }

    #[test]
    fn test_status_display() {
        let err = AppError::from_status("https://example.com/PlanKl20261016.xml", 404);
        assert_eq!(
            err.to_string(),
            "HTTP 404 for https://example.com/PlanKl20261016.xml"
        );
    }
}
