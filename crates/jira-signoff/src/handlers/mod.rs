//! Request handlers for the signoff API.
//!
//! Every handler opens its own Jira session through
//! [`JiraClient::connect`]; sessions are never shared between requests.

pub mod approvals;
pub mod issues;

use axum::{http::StatusCode, Json};
use serde_json::{json, Value};
use tracing::error;

use crate::client::JiraClient;
use crate::config::Config;

pub use approvals::{approve_issues, ApproveIssuesRequest, ApproveIssuesResponse, IssueRef};
pub use issues::{
    get_confluence_links, get_description, process_links, ConfluenceLinksResponse,
    DescriptionResponse, IssueKeyRequest, ProcessLinksRequest, ProcessLinksResponse,
};

/// Message returned when no Jira session can be opened.
pub const CONNECT_ERROR: &str = "unable to connect to Jira server";

/// Error response: status code plus `{"error": "..."}`.
pub type ApiError = (StatusCode, Json<Value>);

/// Handler result carrying a typed JSON body.
pub type ApiResult<T> = Result<Json<T>, ApiError>;

pub(crate) fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(json!({ "error": message.into() })))
}

/// Open a Jira session for the current request.
pub(crate) async fn connect(config: &Config) -> Result<JiraClient, ApiError> {
    JiraClient::connect(config).await.map_err(|e| {
        error!(error = %e, server = %config.server, "Failed to connect to Jira");
        api_error(StatusCode::INTERNAL_SERVER_ERROR, CONNECT_ERROR)
    })
}
