//! Risk controller signoff form.
//!
//! The signoff plugin endpoint accepts a `multipart/form-data` body with a
//! fixed set of classification fields plus one `security-case-*` answer per
//! checklist item.

use reqwest::multipart::Form;

/// Path of the signoff plugin endpoint, relative to the Jira server.
pub const SIGNOFF_PATH: &str =
    "/rest/shopee_risk_controller_signoff/latest/risk_controller_signoff/add";

/// Answer submitted for every security checklist item.
pub const SECURITY_CASE_ANSWER: &str = "no";

/// Security checklist items, in the order the signoff dialog lists them.
pub const SECURITY_CASES: [&str; 26] = [
    "security-case-l1-1",
    "security-case-l2-696",
    "security-case-l2-697",
    "security-case-l1-2",
    "security-case-l2-687",
    "security-case-l2-698",
    "security-case-l1-3",
    "security-case-l2-689",
    "security-case-l1-4",
    "security-case-l2-700",
    "security-case-l2-701",
    "security-case-l1-5",
    "security-case-l2-690",
    "security-case-l2-691",
    "security-case-l2-692",
    "security-case-l2-693",
    "security-case-l2-694",
    "security-case-l2-695",
    "security-case-l1-6",
    "security-case-l2-683",
    "security-case-l2-684",
    "security-case-l2-685",
    "security-case-l2-686",
    "security-case-l2-699",
    "security-case-l1-7",
    "security-case-l2-688",
];

/// Signoff submission for one issue.
#[derive(Debug, Clone)]
pub struct SignoffForm<'a> {
    /// Internal numeric issue id.
    pub issue_id: &'a str,
    /// Risk assessment document URL; may be empty.
    pub doc_url: &'a str,
}

impl<'a> SignoffForm<'a> {
    #[must_use]
    pub fn new(issue_id: &'a str, doc_url: &'a str) -> Self {
        Self { issue_id, doc_url }
    }

    /// Form fields in submission order.
    #[must_use]
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("_charset_", "UTF-8".to_string()),
            ("signoff-type", "0".to_string()),
            ("test-result", "-1".to_string()),
            ("signoff-financial-risk-level", "2".to_string()),
            ("signoff-doc-url", self.doc_url.to_string()),
            ("signoff-comment", String::new()),
            // The endpoint expects the unrendered template placeholder.
            ("signoff-id", "${report.id}".to_string()),
            ("id", self.issue_id.to_string()),
        ];
        fields.extend(
            SECURITY_CASES
                .iter()
                .map(|case| (*case, SECURITY_CASE_ANSWER.to_string())),
        );
        fields
    }

    /// Build the multipart body.
    #[must_use]
    pub fn into_multipart(self) -> Form {
        self.fields()
            .into_iter()
            .fold(Form::new(), |form, (name, value)| form.text(name, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value<'f>(fields: &'f [(&'static str, String)], name: &str) -> Option<&'f str> {
        fields
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_fixed_fields() {
        let fields = SignoffForm::new("10001", "https://confluence.example.com/risk").fields();

        assert_eq!(value(&fields, "_charset_"), Some("UTF-8"));
        assert_eq!(value(&fields, "signoff-type"), Some("0"));
        assert_eq!(value(&fields, "test-result"), Some("-1"));
        assert_eq!(value(&fields, "signoff-financial-risk-level"), Some("2"));
        assert_eq!(
            value(&fields, "signoff-doc-url"),
            Some("https://confluence.example.com/risk")
        );
        assert_eq!(value(&fields, "signoff-comment"), Some(""));
        assert_eq!(value(&fields, "signoff-id"), Some("${report.id}"));
        assert_eq!(value(&fields, "id"), Some("10001"));
    }

    #[test]
    fn test_security_cases_all_answered_no() {
        let fields = SignoffForm::new("1", "").fields();
        let cases: Vec<_> = fields
            .iter()
            .filter(|(name, _)| name.starts_with("security-case-"))
            .collect();

        assert_eq!(cases.len(), SECURITY_CASES.len());
        assert!(cases.iter().all(|(_, v)| v == SECURITY_CASE_ANSWER));
        assert_eq!(fields.len(), 8 + SECURITY_CASES.len());
    }

    #[test]
    fn test_security_cases_unique() {
        let mut names = SECURITY_CASES.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), SECURITY_CASES.len());
    }
}
