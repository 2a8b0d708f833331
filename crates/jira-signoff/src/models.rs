//! Jira REST API types and the summaries returned to the web page.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Placeholder shown for fields that are missing on the issue.
pub const UNSET: &str = "unset";

/// Risk controller value that marks an issue as already signed off.
pub const APPROVED_MARKER: &str = "TRD/PRD";

/// Issue resource as returned by `GET /rest/api/2/issue/{key}`.
#[derive(Debug, Clone, Deserialize)]
pub struct JiraIssue {
    /// Internal numeric id, serialized by Jira as a string.
    #[serde(default)]
    pub id: Option<String>,
    pub key: String,
    #[serde(default)]
    pub fields: IssueFields,
}

/// The subset of issue fields the service reads.
///
/// Custom fields have instance-specific ids, so they are kept in `custom`
/// and looked up by the ids in [`crate::config::CustomFields`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssueFields {
    #[serde(default)]
    pub summary: Option<String>,
    /// `None` when the key is absent, `Some(None)` when it is `null`.
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub reporter: Option<JiraUser>,
    #[serde(default)]
    pub status: Option<JiraStatus>,
    #[serde(flatten)]
    pub custom: Map<String, Value>,
}

/// Deserialize a field that is present in the payload, keeping `null`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl IssueFields {
    /// Look up a custom field, treating JSON `null` as absent.
    #[must_use]
    pub fn custom_field(&self, id: &str) -> Option<&Value> {
        self.custom.get(id).filter(|v| !v.is_null())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JiraUser {
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JiraStatus {
    #[serde(default)]
    pub name: Option<String>,
}

/// Response of `GET /rest/api/2/myself`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Myself {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Shapes the financial risk field is seen in.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FinancialRisk {
    /// Select-list option: `{"value": "High", "id": "..."}`.
    Selected { value: String },
    /// Plain text.
    Text(String),
    /// Anything else (numbers, arrays, objects without `value`).
    Other(Value),
}

impl FinancialRisk {
    /// Decode the raw field value, `None` when the field is absent or null.
    #[must_use]
    pub fn from_field(value: Option<&Value>) -> Option<Self> {
        value.and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Label shown on the page; [`UNSET`] for anything unusable.
    #[must_use]
    pub fn label(field: Option<&Self>) -> String {
        match field {
            Some(Self::Selected { value }) => value.clone(),
            Some(Self::Text(text)) if !text.trim().is_empty() => text.clone(),
            _ => UNSET.to_string(),
        }
    }
}

/// Select-style field carrying a `name` or a `value`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SelectOption {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

impl SelectOption {
    /// Whether either sub-field equals `expected`.
    #[must_use]
    pub fn matches(&self, expected: &str) -> bool {
        self.name.as_deref() == Some(expected) || self.value.as_deref() == Some(expected)
    }
}

impl JiraIssue {
    /// Whether the risk controller field already carries [`APPROVED_MARKER`].
    #[must_use]
    pub fn is_risk_approved(&self, field_id: &str) -> bool {
        self.fields
            .custom_field(field_id)
            .and_then(|v| serde_json::from_value::<SelectOption>(v.clone()).ok())
            .is_some_and(|option| option.matches(APPROVED_MARKER))
    }

    /// Description text as stored: [`UNSET`] when the field is absent and
    /// `None` when it is `null`.
    #[must_use]
    pub fn description(&self) -> Option<String> {
        match &self.fields.description {
            None => Some(UNSET.to_string()),
            Some(description) => description.clone(),
        }
    }

    /// Confluence links referenced by the single-link custom field.
    ///
    /// Empty, whitespace-only and the `NONE` placeholder mean no link.
    #[must_use]
    pub fn confluence_links(&self, field_id: &str) -> Vec<String> {
        match self.fields.custom_field(field_id) {
            Some(Value::String(link)) if is_real_link(link) => vec![link.clone()],
            _ => Vec::new(),
        }
    }
}

fn is_real_link(link: &str) -> bool {
    !link.trim().is_empty() && link != "NONE"
}

/// Issue summary returned by `/api/process_links`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueSummary {
    pub key: String,
    pub title: String,
    pub reporter: String,
    pub financial_risk: String,
    pub status: String,
    pub link: String,
}

impl IssueSummary {
    /// Build a summary from an issue. Returns `None` when the summary,
    /// reporter or status is missing.
    #[must_use]
    pub fn from_issue(issue: &JiraIssue, financial_risk_field: &str, link: String) -> Option<Self> {
        let fields = &issue.fields;
        let risk = FinancialRisk::from_field(fields.custom_field(financial_risk_field));

        Some(Self {
            key: issue.key.clone(),
            title: fields.summary.clone()?,
            reporter: fields.reporter.as_ref()?.display_name.clone()?,
            financial_risk: FinancialRisk::label(risk.as_ref()),
            status: fields.status.as_ref()?.name.clone()?,
            link,
        })
    }
}

/// Outcome of a single signoff attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalOutcome {
    pub success: bool,
    pub message: String,
}

impl ApprovalOutcome {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Per-issue entry of the `/api/approve_issues` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalResult {
    pub key: String,
    pub success: bool,
    pub message: String,
}

impl ApprovalResult {
    #[must_use]
    pub fn new(key: impl Into<String>, outcome: ApprovalOutcome) -> Self {
        Self {
            key: key.into(),
            success: outcome.success,
            message: outcome.message,
        }
    }
}
