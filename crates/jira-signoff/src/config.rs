//! Configuration for the signoff service.

use std::env;
use std::time::Duration;

use crate::error::ConfigError;

/// Default HTTP port, matching the port the web page has always been served on.
pub const DEFAULT_PORT: u16 = 5001;

/// Service configuration, built once at startup and shared by every handler.
#[derive(Clone)]
pub struct Config {
    /// Jira base URL without a trailing slash (e.g. `https://jira.example.com`).
    pub server: String,
    /// Jira user the token belongs to. Only used for logging.
    pub user: Option<String>,
    /// Personal access token sent as a bearer token.
    pub api_token: String,
    /// HTTP server port.
    pub port: u16,
    /// Development mode: human-readable debug logs.
    pub development: bool,
    /// Per-request timeout toward Jira. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Custom field ids read from issues.
    pub fields: CustomFields,
}

/// Ids of the Jira custom fields the service reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomFields {
    /// Financial risk classification (option field).
    pub financial_risk: String,
    /// Risk controller signoff marker.
    pub risk_controller: String,
    /// Single Confluence document link.
    pub confluence_link: String,
}

impl Default for CustomFields {
    fn default() -> Self {
        Self {
            financial_risk: "customfield_14501".to_string(),
            risk_controller: "customfield_15304".to_string(),
            confluence_link: "customfield_11557".to_string(),
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("server", &self.server)
            .field("user", &self.user)
            .field("api_token", &"<redacted>")
            .field("port", &self.port)
            .field("development", &self.development)
            .field("timeout", &self.timeout)
            .field("fields", &self.fields)
            .finish()
    }
}

impl Config {
    /// Build a config for the given server and token with every other setting
    /// at its default.
    #[must_use]
    pub fn new(server: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            server: server.into().trim_end_matches('/').to_string(),
            user: None,
            api_token: api_token.into(),
            port: DEFAULT_PORT,
            development: false,
            timeout: None,
            fields: CustomFields::default(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// `JIRA_SERVER` and `JIRA_API_TOKEN` are required.
    pub fn from_env() -> Result<Self, ConfigError> {
        let server = var("JIRA_SERVER").ok_or(ConfigError::Missing("JIRA_SERVER"))?;
        let api_token = var("JIRA_API_TOKEN").ok_or(ConfigError::Missing("JIRA_API_TOKEN"))?;

        let port = match var("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                var: "PORT",
                value: raw,
            })?,
            None => DEFAULT_PORT,
        };

        let timeout = match var("JIRA_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.parse().map_err(|_| ConfigError::Invalid {
                    var: "JIRA_TIMEOUT_SECS",
                    value: raw,
                })?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        let development = var("APP_ENV")
            .or_else(|| var("FLASK_ENV"))
            .is_some_and(|v| v == "development");

        let defaults = CustomFields::default();
        let fields = CustomFields {
            financial_risk: var("JIRA_FINANCIAL_RISK_FIELD").unwrap_or(defaults.financial_risk),
            risk_controller: var("JIRA_RISK_CONTROLLER_FIELD")
                .unwrap_or(defaults.risk_controller),
            confluence_link: var("JIRA_CONFLUENCE_FIELD").unwrap_or(defaults.confluence_link),
        };

        Ok(Self {
            user: var("JIRA_USER"),
            port,
            development,
            timeout,
            fields,
            ..Self::new(server, api_token)
        })
    }

    /// Canonical browse URL for an issue.
    #[must_use]
    pub fn browse_url(&self, key: &str) -> String {
        format!("{}/browse/{key}", self.server)
    }
}

fn var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|s| !s.trim().is_empty())
}
