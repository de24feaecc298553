//! Issue export model
//!
//! Only the fields the digests read are modeled; everything else in the export
//! is ignored. Pull requests show up in issue listings with a `pull_request`
//! object, and in pull request listings with `merged_at`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;

/// Account that opened the issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Login name
    pub login: String,
}

/// Issue label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    /// Label name
    pub name: String,
}

/// Issue or pull request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Number within the repository
    pub number: u64,
    /// `open` or `closed`
    pub state: String,
    /// Title
    pub title: String,
    /// Author
    pub user: User,
    /// Labels
    #[serde(default)]
    pub labels: Vec<Label>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last update
    pub updated_at: DateTime<Utc>,
    /// Close time
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
    /// Merge time (pull request listings)
    #[serde(default)]
    pub merged_at: Option<DateTime<Utc>>,
    /// Present only for pull requests in issue listings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_request: Option<serde_json::Value>,
}

impl Issue {
    /// Pull request rather than an issue
    #[must_use]
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some() || self.merged_at.is_some()
    }

    /// State is `open`
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state.eq_ignore_ascii_case("open")
    }

    /// `PR` or `Issue`
    #[must_use]
    pub fn kind_label(&self) -> &'static str {
        if self.is_pull_request() { "PR" } else { "Issue" }
    }

    /// Label names joined with `, `
    #[must_use]
    pub fn label_names(&self) -> String {
        self.labels
            .iter()
            .map(|label| label.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Exports are either one array or the raw pages of a paginated listing
#[derive(Deserialize)]
#[serde(untagged)]
enum Export {
    Flat(Vec<Issue>),
    Paged(Vec<Vec<Issue>>),
}

/// Parse an export
///
/// # Errors
///
/// Returns an error if the text is not an issue array or an array of pages.
pub fn parse_issues(json: &str) -> Result<Vec<Issue>> {
    let issues = match serde_json::from_str::<Export>(json) {
        Ok(Export::Flat(issues)) => issues,
        Ok(Export::Paged(pages)) => pages.into_iter().flatten().collect(),
        // Re-parse as a flat list for a precise error message
        Err(_) => serde_json::from_str::<Vec<Issue>>(json)?,
    };
    Ok(issues)
}

/// Load an export from disk
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_issues(path: impl AsRef<Path>) -> Result<Vec<Issue>> {
    let path = path.as_ref();
    let issues = parse_issues(&std::fs::read_to_string(path)?)?;
    tracing::debug!(path = %path.display(), count = issues.len(), "loaded issue export");
    Ok(issues)
}

/// Repository name without the owner (`owner/repo` → `repo`)
#[must_use]
pub fn short_name(full_name: &str) -> &str {
    full_name.rsplit('/').next().unwrap_or(full_name)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub(crate) fn issue(number: u64, login: &str, created: &str) -> Issue {
        let created: DateTime<Utc> = created.parse().expect("timestamp");
        Issue {
            number,
            state: "open".to_string(),
            title: format!("Issue {number}"),
            user: User {
                login: login.to_string(),
            },
            labels: Vec::new(),
            created_at: created,
            updated_at: created,
            closed_at: None,
            merged_at: None,
            pull_request: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPORT: &str = r#"[
  {
    "number": 42,
    "state": "closed",
    "title": "Crash in TC-OO-2.1",
    "user": {"login": "alice", "id": 7},
    "labels": [{"name": "bug"}, {"name": "cert blocker"}],
    "created_at": "2025-01-10T08:00:00Z",
    "updated_at": "2025-01-12T09:30:00Z",
    "closed_at": "2025-01-12T09:30:00Z",
    "comments": 3
  },
  {
    "number": 43,
    "state": "open",
    "title": "Fix PICS for LVL",
    "user": {"login": "bob"},
    "created_at": "2025-01-11T08:00:00Z",
    "updated_at": "2025-01-11T08:00:00Z",
    "pull_request": {"url": "https://example.invalid/pulls/43"}
  }
]"#;

    #[test]
    fn test_parse_flat_export() {
        let issues = parse_issues(EXPORT).expect("parse");
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].label_names(), "bug, cert blocker");
        assert!(!issues[0].is_open());
        assert_eq!(issues[0].kind_label(), "Issue");
        assert!(issues[1].is_pull_request());
        assert_eq!(issues[1].kind_label(), "PR");
        assert!(issues[1].closed_at.is_none());
    }

    #[test]
    fn test_parse_paged_export() {
        let paged = format!("[{EXPORT}, []]");
        let issues = parse_issues(&paged).expect("parse");
        assert_eq!(issues.len(), 2);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_issues(r#"{"message": "Bad credentials"}"#).is_err());
        assert!(parse_issues(r#"[{"number": "x"}]"#).is_err());
    }

    #[test]
    fn test_merged_pull_request() {
        let json = r#"[{
            "number": 9, "state": "closed", "title": "t", "user": {"login": "c"},
            "created_at": "2025-01-01T00:00:00Z", "updated_at": "2025-01-02T00:00:00Z",
            "merged_at": "2025-01-02T00:00:00Z"
        }]"#;
        let issues = parse_issues(json).expect("parse");
        assert!(issues[0].is_pull_request());
    }

    #[test]
    fn test_load_issues() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("issues.json");
        std::fs::write(&path, EXPORT).expect("write");
        assert_eq!(load_issues(&path).expect("load").len(), 2);
        assert!(load_issues(dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_short_name() {
        assert_eq!(short_name("project/test-scripts"), "test-scripts");
        assert_eq!(short_name("standalone"), "standalone");
    }
}
