//! REST client for Jira and the risk controller signoff plugin.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{StatusCode, Url};
use tracing::{debug, info, instrument, warn};

use crate::config::{Config, CustomFields};
use crate::error::{JiraError, Result};
use crate::models::{ApprovalOutcome, IssueSummary, JiraIssue, Myself};
use crate::signoff::{SignoffForm, SIGNOFF_PATH};

/// Status codes the signoff endpoint answers with on success.
const SIGNOFF_SUCCESS: [StatusCode; 3] =
    [StatusCode::OK, StatusCode::CREATED, StatusCode::NO_CONTENT];

/// Authenticated Jira session.
///
/// TLS certificate verification is disabled for every request.
#[derive(Debug, Clone)]
pub struct JiraClient {
    client: reqwest::Client,
    server: String,
    base: Url,
    fields: CustomFields,
}

impl JiraClient {
    /// Build a client from configuration without contacting Jira.
    ///
    /// # Errors
    ///
    /// Returns an error if the server is not an absolute http(s) URL, the
    /// token is not a valid header value or the HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self> {
        let base = Url::parse(&config.server)
            .ok()
            .filter(|url| matches!(url.scheme(), "http" | "https") && !url.cannot_be_a_base())
            .ok_or_else(|| JiraError::InvalidServer(config.server.clone()))?;

        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.api_token))
            .map_err(|_| JiraError::InvalidToken)?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .danger_accept_invalid_certs(true);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            server: config.server.clone(),
            base,
            fields: config.fields.clone(),
        })
    }

    /// Build a client and verify the credentials against `/myself`.
    ///
    /// # Errors
    ///
    /// Returns an error on any transport failure or non-200 answer. The body
    /// of a 200 answer is not required to be JSON.
    pub async fn connect(config: &Config) -> Result<Self> {
        let client = Self::new(config)?;
        match client.myself().await? {
            Some(me) => debug!(
                user = me.name.as_deref().unwrap_or("unknown"),
                display_name = me.display_name.as_deref().unwrap_or("unknown"),
                "Connected to Jira"
            ),
            None => debug!("Connected to Jira, /myself returned no user details"),
        }
        Ok(client)
    }

    /// Check the credentials and fetch the authenticated user.
    ///
    /// Only the status decides success; the user is `None` when the body
    /// does not parse.
    pub async fn myself(&self) -> Result<Option<Myself>> {
        let url = self.api_url(&["myself"])?;
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(JiraError::Unauthorized(status));
        }

        Ok(serde_json::from_slice(&response.bytes().await?).ok())
    }

    /// Fetch the raw issue resource.
    ///
    /// The key is sent as a single escaped path segment.
    #[instrument(skip(self))]
    pub async fn get_issue(&self, issue_key: &str) -> Result<JiraIssue> {
        let url = self.api_url(&["issue", issue_key])?;
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(JiraError::Status { status, body });
        }

        Ok(serde_json::from_slice(&response.bytes().await?)?)
    }

    /// Fetch the summary shown in the issue table.
    ///
    /// Returns `None` when the issue cannot be fetched or lacks the summary,
    /// reporter or status.
    pub async fn get_issue_summary(&self, issue_key: &str) -> Option<IssueSummary> {
        let issue = match self.get_issue(issue_key).await {
            Ok(issue) => issue,
            Err(e) => {
                warn!(issue_key = %issue_key, error = %e, "Failed to fetch issue");
                return None;
            }
        };

        let link = format!("{}/browse/{}", self.server, issue.key);
        let summary = IssueSummary::from_issue(&issue, &self.fields.financial_risk, link);
        if summary.is_none() {
            warn!(issue_key = %issue_key, "Issue is missing summary, reporter or status");
        }
        summary
    }

    /// Fetch the issue description.
    ///
    /// `"unset"` when the field is absent, `None` when it is null or the
    /// issue cannot be fetched.
    pub async fn get_issue_description(&self, issue_key: &str) -> Option<String> {
        match self.get_issue(issue_key).await {
            Ok(issue) => issue.description(),
            Err(e) => {
                warn!(issue_key = %issue_key, error = %e, "Failed to fetch description");
                None
            }
        }
    }

    /// Fetch the Confluence links referenced by the issue (zero or one).
    pub async fn get_confluence_links(&self, issue_key: &str) -> Result<Vec<String>> {
        let issue = self.get_issue(issue_key).await?;
        Ok(issue.confluence_links(&self.fields.confluence_link))
    }

    /// Submit the risk controller signoff for an issue.
    ///
    /// Issues whose risk controller field already reads `TRD/PRD` are
    /// reported as approved without posting again. Never fails; every error
    /// is folded into the returned outcome.
    #[instrument(skip(self, risk_url))]
    pub async fn approve_issue(&self, issue_key: &str, risk_url: &str) -> ApprovalOutcome {
        let issue = match self.get_issue(issue_key).await {
            Ok(issue) => issue,
            Err(JiraError::Status { status, .. }) => {
                warn!(status = status.as_u16(), "Failed to fetch issue for approval");
                return ApprovalOutcome::failure(format!(
                    "unable to fetch issue: HTTP {}",
                    status.as_u16()
                ));
            }
            Err(e) => return ApprovalOutcome::failure(format!("approval error: {e}")),
        };

        if issue.is_risk_approved(&self.fields.risk_controller) {
            info!("Issue already signed off");
            return ApprovalOutcome::success("already approved");
        }

        let Some(issue_id) = issue.id.as_deref() else {
            return ApprovalOutcome::failure("approval error: issue has no id");
        };

        match self.submit_signoff(SignoffForm::new(issue_id, risk_url)).await {
            Ok(()) => {
                info!("Signoff submitted");
                ApprovalOutcome::success("approved")
            }
            Err(JiraError::Status { status, body }) => {
                warn!(status = status.as_u16(), "Signoff rejected");
                ApprovalOutcome::failure(format!(
                    "approval failed: HTTP {} - {body}",
                    status.as_u16()
                ))
            }
            Err(e) => {
                warn!(error = %e, "Signoff request failed");
                ApprovalOutcome::failure(format!("approval error: {e}"))
            }
        }
    }

    /// `{server}/rest/api/2/` followed by `segments`, each percent-encoded.
    fn api_url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| JiraError::InvalidServer(self.server.clone()))?
            .pop_if_empty()
            .extend(["rest", "api", "2"])
            .extend(segments);
        Ok(url)
    }

    async fn submit_signoff(&self, form: SignoffForm<'_>) -> Result<()> {
        let url = format!("{}{SIGNOFF_PATH}", self.server);
        let response = self
            .client
            .post(&url)
            .multipart(form.into_multipart())
            .send()
            .await?;

        let status = response.status();
        if SIGNOFF_SUCCESS.contains(&status) {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(JiraError::Status { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(server: &MockServer) -> Config {
        Config::new(server.uri(), "test-token")
    }

    #[tokio::test]
    async fn test_connect_sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/api/2/myself"))
            .and(header("authorization", "Bearer test-token"))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "risk-bot",
                "displayName": "Risk Bot"
            })))
            .expect(1)
            .mount(&server)
            .await;

        assert!(JiraClient::connect(&config(&server)).await.is_ok());
    }

    #[tokio::test]
    async fn test_connect_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/api/2/myself"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = JiraClient::connect(&config(&server)).await.unwrap_err();
        assert!(matches!(err, JiraError::Unauthorized(StatusCode::UNAUTHORIZED)));
    }

    #[tokio::test]
    async fn test_connect_accepts_non_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/api/2/myself"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        assert!(JiraClient::connect(&config(&server)).await.is_ok());
    }

    #[tokio::test]
    async fn test_connect_unreachable() {
        let config = Config::new("http://127.0.0.1:1", "t");
        let err = JiraClient::connect(&config).await.unwrap_err();
        assert!(matches!(err, JiraError::Http(_)));
    }

    #[test]
    fn test_invalid_token() {
        let config = Config::new("https://jira.example.com", "bad\ntoken");
        assert!(matches!(
            JiraClient::new(&config),
            Err(JiraError::InvalidToken)
        ));
    }

    #[test]
    fn test_invalid_server() {
        for server in ["jira.example.com", "mailto:risk@example.com", ""] {
            assert!(
                matches!(
                    JiraClient::new(&Config::new(server, "t")),
                    Err(JiraError::InvalidServer(_))
                ),
                "{server}"
            );
        }
    }

    #[tokio::test]
    async fn test_issue_key_is_one_path_segment() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/api/2/myself"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/api/2/issue/AB-1%3Fexpand=changelog"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let client = JiraClient::new(&config(&server)).unwrap();
        assert!(client.get_issue("../myself").await.is_err());
        assert!(matches!(
            client.get_issue("AB-1?expand=changelog").await,
            Err(JiraError::Status { status: StatusCode::NOT_FOUND, .. })
        ));

        let requests = server.received_requests().await.unwrap();
        assert!(requests.iter().all(|r| r.url.query().is_none()));
    }

    #[tokio::test]
    async fn test_server_path_prefix_is_kept() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/jira/rest/api/2/issue/AB-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "10001",
                "key": "AB-1",
                "fields": {}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let config = Config::new(format!("{}/jira/", server.uri()), "t");
        let client = JiraClient::new(&config).unwrap();
        assert_eq!(client.get_issue("AB-1").await.unwrap().key, "AB-1");
    }

    #[tokio::test]
    async fn test_summary_missing_issue() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/api/2/issue/AB-404"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = JiraClient::new(&config(&server)).unwrap();
        assert!(client.get_issue_summary("AB-404").await.is_none());
        assert!(client.get_issue_description("AB-404").await.is_none());
        assert!(matches!(
            client.get_confluence_links("AB-404").await,
            Err(JiraError::Status { status: StatusCode::NOT_FOUND, .. })
        ));
    }

    #[tokio::test]
    async fn test_summary_invalid_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/api/2/issue/AB-1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
            .mount(&server)
            .await;

        let client = JiraClient::new(&config(&server)).unwrap();
        assert!(client.get_issue_summary("AB-1").await.is_none());
    }

    #[tokio::test]
    async fn test_summary_financial_risk_option() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/api/2/issue/AB-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "10002",
                "key": "AB-2",
                "fields": {
                    "summary": "Payout limits",
                    "reporter": {"displayName": "Lee"},
                    "status": {"name": "In Review"},
                    "customfield_14501": {"value": "High", "id": "7"}
                }
            })))
            .mount(&server)
            .await;

        let client = JiraClient::new(&config(&server)).unwrap();
        let summary = client.get_issue_summary("AB-2").await.unwrap();
        assert_eq!(summary.financial_risk, "High");
        assert_eq!(summary.status, "In Review");
        assert_eq!(summary.link, format!("{}/browse/AB-2", server.uri()));
    }

    #[tokio::test]
    async fn test_approve_fetch_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/api/2/issue/AB-9"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(SIGNOFF_PATH))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = JiraClient::new(&config(&server)).unwrap();
        let outcome = client.approve_issue("AB-9", "").await;
        assert!(!outcome.success);
        assert_eq!(outcome.message, "unable to fetch issue: HTTP 403");
    }

    #[tokio::test]
    async fn test_approve_unreachable_server() {
        let client = JiraClient::new(&Config::new("http://127.0.0.1:1", "t")).unwrap();
        let outcome = client.approve_issue("AB-1", "https://doc").await;
        assert!(!outcome.success);
        assert!(
            outcome.message.starts_with("approval error: "),
            "{}",
            outcome.message
        );
    }

    #[tokio::test]
    async fn test_approve_issue_without_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/api/2/issue/AB-5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "key": "AB-5",
                "fields": {"summary": "No id"}
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(SIGNOFF_PATH))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = JiraClient::new(&config(&server)).unwrap();
        let outcome = client.approve_issue("AB-5", "https://doc").await;
        assert!(!outcome.success);
        assert_eq!(outcome.message, "approval error: issue has no id");
    }

    #[tokio::test]
    async fn test_approve_signoff_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/api/2/issue/AB-6"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "10006",
                "key": "AB-6",
                "fields": {}
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(SIGNOFF_PATH))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .expect(1)
            .mount(&server)
            .await;

        let mut config = config(&server);
        config.timeout = Some(Duration::from_millis(500));
        let client = JiraClient::new(&config).unwrap();
        let outcome = client.approve_issue("AB-6", "https://doc").await;
        assert!(!outcome.success);
        assert!(
            outcome.message.starts_with("approval error: "),
            "{}",
            outcome.message
        );
    }
}
