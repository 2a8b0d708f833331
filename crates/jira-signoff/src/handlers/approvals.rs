//! Batch signoff handler.

use std::collections::HashMap;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{connect, ApiResult};
use crate::models::ApprovalResult;
use crate::server::AppState;

/// Issue entry sent by the page; only the key is read.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueRef {
    pub key: String,
}

/// Body of `POST /api/approve_issues`.
#[derive(Debug, Default, Deserialize)]
pub struct ApproveIssuesRequest {
    #[serde(default)]
    pub issues: Vec<IssueRef>,
    /// Risk document URL per issue key.
    #[serde(default)]
    pub risk_urls: HashMap<String, String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApproveIssuesResponse {
    pub results: Vec<ApprovalResult>,
}

/// Sign off every issue in order. A failed issue is reported in its own
/// result and does not stop the batch.
pub async fn approve_issues(
    State(state): State<AppState>,
    Json(request): Json<ApproveIssuesRequest>,
) -> ApiResult<ApproveIssuesResponse> {
    let client = connect(&state.config).await?;

    let mut results = Vec::with_capacity(request.issues.len());
    for issue in &request.issues {
        let risk_url = request
            .risk_urls
            .get(&issue.key)
            .map_or("", String::as_str);
        let outcome = client.approve_issue(&issue.key, risk_url).await;
        results.push(ApprovalResult::new(issue.key.clone(), outcome));
    }

    let approved = results.iter().filter(|r| r.success).count();
    info!(
        approved,
        failed = results.len() - approved,
        "Approval batch finished"
    );

    Ok(Json(ApproveIssuesResponse { results }))
}
