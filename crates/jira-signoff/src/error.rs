//! Error types for the Jira signoff service.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors returned by [`crate::JiraClient`] operations.
#[derive(Debug, Error)]
pub enum JiraError {
    /// Transport-level failure (DNS, TLS, connection reset, timeout).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Jira answered with an unexpected status code.
    #[error("Jira API returned HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// Response body did not match the expected shape.
    #[error("Failed to parse Jira response: {0}")]
    Json(#[from] serde_json::Error),

    /// The API token cannot be used as a header value.
    #[error("API token is not a valid header value")]
    InvalidToken,

    /// `JIRA_SERVER` is not an absolute http(s) URL.
    #[error("invalid Jira server URL '{0}'")]
    InvalidServer(String),

    /// The connectivity probe against `/myself` was rejected.
    #[error("Jira rejected credentials: HTTP {0}")]
    Unauthorized(StatusCode),
}

/// Errors produced while loading [`crate::Config`] from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is unset or empty.
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    /// A variable is set but cannot be parsed.
    #[error("invalid value {value:?} for {var}")]
    Invalid { var: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, JiraError>;
