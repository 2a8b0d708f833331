//! Issue key extraction from pasted Jira links.
//!
//! Accepted inputs:
//! - casement style URLs carrying a `jiraKey=SPSK-1&...` query parameter
//! - browse URLs such as `https://jira.example.com/browse/SPSK-216547?focus=1`
//! - bare keys such as `SPSK-216547`

use std::collections::HashSet;

const JIRA_KEY_PARAM: &str = "jiraKey=";
const BROWSE_SEGMENT: &str = "browse/";

/// Extract the issue key from a link or raw ticket id.
///
/// Returns `None` when the input matches none of the accepted formats.
#[must_use]
pub fn extract_issue_key(link: &str) -> Option<String> {
    let link = link.trim();

    let candidate = if link.contains(JIRA_KEY_PARAM) {
        link.split(JIRA_KEY_PARAM)
            .nth(1)
            .and_then(|rest| rest.split('&').next())
    } else if link.contains(BROWSE_SEGMENT) {
        link.split(BROWSE_SEGMENT)
            .nth(1)
            .and_then(|rest| rest.split('?').next())
    } else if link.contains('-') && !link.starts_with("http") {
        Some(link)
    } else {
        None
    };

    let mut key = candidate?.split('?').next().unwrap_or_default().trim();
    if key.starts_with("https://") {
        key = key.rsplit('/').next().unwrap_or_default();
    }

    if key.is_empty() {
        None
    } else {
        Some(key.to_string())
    }
}

/// Extract keys from a batch of links, keeping the first occurrence of each
/// key in input order. Blank and unrecognized links are skipped.
#[must_use]
pub fn unique_issue_keys<S: AsRef<str>>(links: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    links
        .iter()
        .map(|link| link.as_ref().trim())
        .filter(|link| !link.is_empty())
        .filter_map(extract_issue_key)
        .filter(|key| seen.insert(key.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jira_key_param() {
        assert_eq!(
            extract_issue_key("https://casement.scredit.io/review?jiraKey=SPSK-216547&tab=risk"),
            Some("SPSK-216547".to_string())
        );
        assert_eq!(
            extract_issue_key("https://casement.scredit.io/review?jiraKey=AB-9"),
            Some("AB-9".to_string())
        );
    }

    #[test]
    fn test_jira_key_param_wins_over_browse() {
        assert_eq!(
            extract_issue_key("https://jira.example.com/browse/XX-1?jiraKey=AB-2&x=1"),
            Some("AB-2".to_string())
        );
    }

    #[test]
    fn test_browse_url() {
        assert_eq!(
            extract_issue_key("https://jira.shopee.io/browse/SPSK-216547?filter=-1"),
            Some("SPSK-216547".to_string())
        );
        assert_eq!(
            extract_issue_key("https://jira.example.com/browse/AB-1"),
            Some("AB-1".to_string())
        );
    }

    #[test]
    fn test_bare_key() {
        assert_eq!(extract_issue_key("ABC-123"), Some("ABC-123".to_string()));
        assert_eq!(extract_issue_key("  ABC-123  "), Some("ABC-123".to_string()));
    }

    #[test]
    fn test_bare_key_query_is_stripped() {
        assert_eq!(extract_issue_key("ABC-123?foo=bar"), Some("ABC-123".to_string()));
    }

    #[test]
    fn test_jira_key_param_holding_url() {
        assert_eq!(
            extract_issue_key("https://x.io/?jiraKey=https://jira.example.com/browse2/AB-7&y"),
            Some("AB-7".to_string())
        );
    }

    #[test]
    fn test_no_match() {
        assert_eq!(extract_issue_key("https://example.com/some-page"), None);
        assert_eq!(extract_issue_key("nohyphen"), None);
        assert_eq!(extract_issue_key(""), None);
        assert_eq!(extract_issue_key("https://x.io/?jiraKey=&tab=1"), None);
        assert_eq!(extract_issue_key("https://jira.example.com/browse/"), None);
    }

    #[test]
    fn test_unique_issue_keys_dedupes_in_order() {
        let links = [
            "https://jira.example.com/browse/AB-1",
            "AB-2",
            "https://jira.example.com/browse/AB-1?focus=1",
            "   ",
            "not a link",
            "https://casement.scredit.io/?jiraKey=AB-2&a=b",
            "AB-3",
        ];
        assert_eq!(unique_issue_keys(&links), vec!["AB-1", "AB-2", "AB-3"]);
    }

    #[test]
    fn test_unique_issue_keys_empty() {
        let links: Vec<String> = Vec::new();
        assert!(unique_issue_keys(&links).is_empty());
    }
}
