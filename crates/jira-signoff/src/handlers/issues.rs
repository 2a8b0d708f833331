//! Issue lookup handlers: link batches, descriptions and Confluence links.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::{api_error, connect, ApiError, ApiResult};
use crate::links::unique_issue_keys;
use crate::models::IssueSummary;
use crate::server::AppState;

/// Body of `POST /api/process_links`.
#[derive(Debug, Default, Deserialize)]
pub struct ProcessLinksRequest {
    #[serde(default)]
    pub links: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProcessLinksResponse {
    pub issues: Vec<IssueSummary>,
}

/// Body of the single-issue endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct IssueKeyRequest {
    #[serde(default)]
    pub issue_key: Option<String>,
}

impl IssueKeyRequest {
    fn key(&self) -> Result<&str, ApiError> {
        self.issue_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "issue_key is required"))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DescriptionResponse {
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfluenceLinksResponse {
    pub confluence_links: Vec<String>,
}

/// Resolve pasted links to issue summaries.
///
/// Keys are deduplicated in first-seen order. Issues that cannot be fetched
/// are left out of the response.
pub async fn process_links(
    State(state): State<AppState>,
    Json(request): Json<ProcessLinksRequest>,
) -> ApiResult<ProcessLinksResponse> {
    let client = connect(&state.config).await?;

    let keys = unique_issue_keys(&request.links);
    info!(
        links = request.links.len(),
        unique = keys.len(),
        "Processing links"
    );

    let mut issues = Vec::with_capacity(keys.len());
    for key in &keys {
        if let Some(summary) = client.get_issue_summary(key).await {
            issues.push(summary);
        }
    }

    if issues.len() < keys.len() {
        info!(
            dropped = keys.len() - issues.len(),
            "Some issues could not be fetched"
        );
    }

    Ok(Json(ProcessLinksResponse { issues }))
}

/// Fetch the description of one issue. `description` is `null` when the
/// field is `null` or the issue cannot be fetched.
pub async fn get_description(
    State(state): State<AppState>,
    Json(request): Json<IssueKeyRequest>,
) -> ApiResult<DescriptionResponse> {
    let key = request.key()?;
    let client = connect(&state.config).await?;

    let description = client.get_issue_description(key).await;
    Ok(Json(DescriptionResponse { description }))
}

/// Fetch the Confluence links referenced by one issue.
pub async fn get_confluence_links(
    State(state): State<AppState>,
    Json(request): Json<IssueKeyRequest>,
) -> ApiResult<ConfluenceLinksResponse> {
    let key = request.key()?;
    let client = connect(&state.config).await?;

    match client.get_confluence_links(key).await {
        Ok(confluence_links) => Ok(Json(ConfluenceLinksResponse { confluence_links })),
        Err(e) => {
            error!(issue_key = %key, error = %e, "Failed to fetch Confluence links");
            Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("unable to fetch issue: {e}"),
            ))
        }
    }
}
