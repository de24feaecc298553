//! Issue digests
//!
//! Filtering, the weekly new/closed/open split, merged pull requests in a
//! date range, and the sheet row layouts for each.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

use crate::error::{Error, Result};
use crate::models::Issue;

/// Per-repository and combined issue sheet header
pub const ISSUE_HEADER: [&str; 14] = [
    "Repository Name",
    "Issue Number",
    "State",
    "Title",
    "Author",
    "Labels",
    "Created Date",
    "Updated Date",
    "Link",
    "Year",
    "Month",
    "Ref_1",
    "Ref_2",
    "Type",
];

/// Weekly sheet header
pub const WEEKLY_HEADER: [&str; 7] = [
    "Repository Name",
    "Issue Number",
    "State",
    "Issue Title",
    "Author/Raised By",
    "Issue url",
    "Type",
];

/// Merged pull request sheet header
pub const MERGED_HEADER: [&str; 6] = [
    "Repository Name",
    "PR Number",
    "Title",
    "Author",
    "PR URL",
    "Merged Date",
];

/// Which issues to keep and how to tag them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigestConfig {
    /// Keep pull requests
    #[serde(default = "default_true")]
    pub include_pull_requests: bool,
    /// Keep only these authors (all when unset)
    #[serde(default)]
    pub author_filter: Option<BTreeSet<String>>,
    /// Authors tagged with `highlight_tag` in `Ref_1`
    #[serde(default)]
    pub highlighted_authors: BTreeSet<String>,
    /// `Ref_1` value for highlighted authors
    #[serde(default = "default_highlight_tag")]
    pub highlight_tag: String,
    /// `Ref_2` value for every row
    #[serde(default = "default_team_tag")]
    pub team_tag: String,
    /// Base for issue and pull request links
    #[serde(default = "default_web_base_url")]
    pub web_base_url: String,
}

fn default_true() -> bool {
    true
}

fn default_highlight_tag() -> String {
    "QA".to_string()
}

fn default_team_tag() -> String {
    "TEAM".to_string()
}

fn default_web_base_url() -> String {
    "https://github.com".to_string()
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            include_pull_requests: true,
            author_filter: None,
            highlighted_authors: BTreeSet::new(),
            highlight_tag: default_highlight_tag(),
            team_tag: default_team_tag(),
            web_base_url: default_web_base_url(),
        }
    }
}

/// Logins compare trimmed and case-insensitive
fn contains_login(set: &BTreeSet<String>, login: &str) -> bool {
    let login = login.trim();
    set.iter().any(|candidate| candidate.trim().eq_ignore_ascii_case(login))
}

impl DigestConfig {
    /// Issue passes the pull request and author filters
    #[must_use]
    pub fn keeps(&self, issue: &Issue) -> bool {
        if !self.include_pull_requests && issue.pull_request.is_some() {
            return false;
        }
        self.author_filter
            .as_ref()
            .is_none_or(|authors| contains_login(authors, &issue.user.login))
    }

    /// Author gets the highlight tag
    #[must_use]
    pub fn is_highlighted(&self, login: &str) -> bool {
        contains_login(&self.highlighted_authors, login)
    }

    /// Web link to an issue or pull request
    #[must_use]
    pub fn link(&self, repository: &str, issue: &Issue) -> String {
        let kind = if issue.is_pull_request() { "pull" } else { "issues" };
        format!(
            "{}/{repository}/{kind}/{}",
            self.web_base_url.trim_end_matches('/'),
            issue.number
        )
    }
}

/// Apply the config filters and drop repeated issue numbers
///
/// The first occurrence of a number wins, so overlapping export pages do not
/// produce duplicate rows.
#[must_use]
pub fn filter(issues: &[Issue], config: &DigestConfig) -> Vec<Issue> {
    let mut seen = HashSet::new();
    issues
        .iter()
        .filter(|issue| config.keeps(issue))
        .filter(|issue| seen.insert(issue.number))
        .cloned()
        .collect()
}

/// Issues split by recent activity
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeeklyBuckets {
    /// Created in the last seven days
    pub new: Vec<Issue>,
    /// Closed in the last seven days, created earlier
    pub closed: Vec<Issue>,
    /// Still open, no recent creation or close
    pub open: Vec<Issue>,
}

/// Split issues into the weekly buckets
///
/// Each issue lands in at most one bucket; a new issue that was also closed
/// this week counts as new.
#[must_use]
pub fn weekly_buckets(issues: &[Issue], now: DateTime<Utc>) -> WeeklyBuckets {
    let since = now - Duration::days(7);
    let mut buckets = WeeklyBuckets::default();
    for issue in issues {
        if issue.created_at >= since {
            buckets.new.push(issue.clone());
        } else if issue.closed_at.is_some_and(|closed| closed >= since) {
            buckets.closed.push(issue.clone());
        } else if issue.is_open() {
            buckets.open.push(issue.clone());
        }
    }
    tracing::debug!(
        new = buckets.new.len(),
        closed = buckets.closed.len(),
        open = buckets.open.len(),
        "weekly buckets"
    );
    buckets
}

/// Check a merge date range
///
/// # Errors
///
/// Returns a validation error if `start` is after `end`.
pub fn validate_range(start: NaiveDate, end: NaiveDate) -> Result<()> {
    if start > end {
        return Err(Error::Validation(format!(
            "start date {start} is after end date {end}"
        )));
    }
    Ok(())
}

/// Pull requests merged between `start` and `end`, both inclusive
///
/// Sorted by number, newest first.
///
/// # Errors
///
/// Returns a validation error if `start` is after `end`.
pub fn merged_between(prs: &[Issue], start: NaiveDate, end: NaiveDate) -> Result<Vec<Issue>> {
    validate_range(start, end)?;
    let mut merged: Vec<Issue> = prs
        .iter()
        .filter(|pr| {
            pr.merged_at
                .is_some_and(|at| (start..=end).contains(&at.date_naive()))
        })
        .cloned()
        .collect();
    merged.sort_by(|a, b| b.number.cmp(&a.number));
    Ok(merged)
}

/// One row of an issue sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRow {
    /// Creation time, the combined sheet's sort key
    pub created_at: DateTime<Utc>,
    /// Cells in [`ISSUE_HEADER`] order
    pub cells: Vec<String>,
}

impl IssueRow {
    /// Render an issue
    #[must_use]
    pub fn new(repository: &str, issue: &Issue, config: &DigestConfig) -> Self {
        let created = issue.created_at;
        let ref_1 = if config.is_highlighted(&issue.user.login) {
            config.highlight_tag.clone()
        } else {
            String::new()
        };
        let cells = vec![
            repository.to_string(),
            issue.number.to_string(),
            issue.state.clone(),
            issue.title.clone(),
            issue.user.login.trim().to_string(),
            issue.label_names(),
            created.format("%Y-%m-%d %H:%M:%S").to_string(),
            issue.updated_at.format("%Y-%m-%d").to_string(),
            config.link(repository, issue),
            created.year().to_string(),
            created.format("%b").to_string(),
            ref_1,
            config.team_tag.clone(),
            issue.kind_label().to_string(),
        ];
        Self {
            created_at: created,
            cells,
        }
    }
}

/// Rows for one repository, sorted by number, newest first
#[must_use]
pub fn issue_rows(repository: &str, issues: &[Issue], config: &DigestConfig) -> Vec<IssueRow> {
    let mut sorted: Vec<&Issue> = issues.iter().collect();
    sorted.sort_by(|a, b| b.number.cmp(&a.number));
    sorted
        .into_iter()
        .map(|issue| IssueRow::new(repository, issue, config))
        .collect()
}

/// Rows from several repositories, sorted by creation time, newest first
#[must_use]
pub fn combined_rows(rows: impl IntoIterator<Item = IssueRow>) -> Vec<IssueRow> {
    let mut rows: Vec<IssueRow> = rows.into_iter().collect();
    // Stable, so per-repository order survives ties
    rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    rows
}

/// Weekly sheet row
#[must_use]
pub fn weekly_row(repository: &str, issue: &Issue, config: &DigestConfig) -> Vec<String> {
    vec![
        repository.to_string(),
        issue.number.to_string(),
        issue.state.clone(),
        issue.title.clone(),
        issue.user.login.clone(),
        config.link(repository, issue),
        issue.kind_label().to_string(),
    ]
}

/// Merged pull request sheet row
#[must_use]
pub fn merged_row(repository: &str, pr: &Issue, config: &DigestConfig) -> Vec<String> {
    let base = config.web_base_url.trim_end_matches('/');
    vec![
        repository.to_string(),
        pr.number.to_string(),
        pr.title.clone(),
        pr.user.login.clone(),
        format!("{base}/{repository}/pull/{}", pr.number),
        pr.merged_at.map_or_else(
            || "N/A".to_string(),
            |at| at.format("%Y-%m-%d").to_string(),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::issue;

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().expect("timestamp")
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("date")
    }

    fn pr(number: u64, merged: Option<&str>) -> Issue {
        let mut pr = issue(number, "dev", "2025-01-01T00:00:00Z");
        pr.pull_request = Some(serde_json::json!({}));
        pr.merged_at = merged.map(at);
        pr.state = "closed".to_string();
        pr
    }

    #[test]
    fn test_default_config() {
        let config: DigestConfig = serde_json::from_str("{}").expect("parse");
        assert_eq!(config, DigestConfig::default());
        assert!(config.include_pull_requests);
        assert_eq!(config.highlight_tag, "QA");
    }

    #[test]
    fn test_filter_excludes_pull_requests_and_dedups() {
        let mut with_pr = issue(2, "alice", "2025-01-02T00:00:00Z");
        with_pr.pull_request = Some(serde_json::json!({"url": "x"}));
        let issues = vec![
            issue(1, "alice", "2025-01-01T00:00:00Z"),
            with_pr,
            issue(1, "alice", "2025-01-01T00:00:00Z"),
        ];

        assert_eq!(filter(&issues, &DigestConfig::default()).len(), 2);

        let config = DigestConfig {
            include_pull_requests: false,
            ..DigestConfig::default()
        };
        let kept = filter(&issues, &config);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].number, 1);
    }

    #[test]
    fn test_filter_by_author() {
        let issues = vec![
            issue(1, "Alice", "2025-01-01T00:00:00Z"),
            issue(2, "bob", "2025-01-01T00:00:00Z"),
        ];
        let config = DigestConfig {
            author_filter: Some(BTreeSet::from([" alice ".to_string()])),
            ..DigestConfig::default()
        };
        let kept = filter(&issues, &config);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].user.login, "Alice");
    }

    #[test]
    fn test_weekly_buckets() {
        let now = at("2025-03-15T12:00:00Z");
        let fresh = issue(1, "a", "2025-03-14T00:00:00Z");

        let mut fresh_closed = issue(2, "a", "2025-03-10T00:00:00Z");
        fresh_closed.state = "closed".to_string();
        fresh_closed.closed_at = Some(at("2025-03-12T00:00:00Z"));

        let mut closed = issue(3, "a", "2025-01-01T00:00:00Z");
        closed.state = "closed".to_string();
        closed.closed_at = Some(at("2025-03-13T00:00:00Z"));

        let stale_open = issue(4, "a", "2025-01-01T00:00:00Z");

        let mut stale_closed = issue(5, "a", "2025-01-01T00:00:00Z");
        stale_closed.state = "closed".to_string();
        stale_closed.closed_at = Some(at("2025-02-01T00:00:00Z"));

        let buckets = weekly_buckets(&[fresh, fresh_closed, closed, stale_open, stale_closed], now);
        let numbers = |v: &[Issue]| v.iter().map(|i| i.number).collect::<Vec<_>>();
        assert_eq!(numbers(&buckets.new), vec![1, 2]);
        assert_eq!(numbers(&buckets.closed), vec![3]);
        assert_eq!(numbers(&buckets.open), vec![4]);
    }

    #[test]
    fn test_weekly_boundary_is_inclusive() {
        let now = at("2025-03-15T12:00:00Z");
        let edge = issue(1, "a", "2025-03-08T12:00:00Z");
        assert_eq!(weekly_buckets(&[edge], now).new.len(), 1);
    }

    #[test]
    fn test_merged_between() {
        let prs = vec![
            pr(10, Some("2025-01-01T23:59:59Z")),
            pr(11, Some("2025-01-31T00:00:00Z")),
            pr(12, Some("2025-02-01T00:00:00Z")),
            pr(13, None),
        ];
        let merged = merged_between(&prs, date(2025, 1, 1), date(2025, 1, 31)).expect("range");
        let numbers: Vec<u64> = merged.iter().map(|p| p.number).collect();
        assert_eq!(numbers, vec![11, 10]);
    }

    #[test]
    fn test_merged_between_rejects_reversed_range() {
        let err = merged_between(&[], date(2025, 2, 1), date(2025, 1, 1)).expect_err("reversed");
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_issue_row_layout() {
        let mut subject = issue(7, "qa-bot", "2025-02-03T04:05:06Z");
        subject.updated_at = at("2025-02-10T00:00:00Z");
        subject.labels = vec![crate::models::Label {
            name: "bug".to_string(),
        }];
        let config = DigestConfig {
            highlighted_authors: BTreeSet::from(["QA-Bot".to_string()]),
            ..DigestConfig::default()
        };
        let row = IssueRow::new("project/tools", &subject, &config);
        assert_eq!(row.cells.len(), ISSUE_HEADER.len());
        assert_eq!(
            row.cells,
            vec![
                "project/tools",
                "7",
                "open",
                "Issue 7",
                "qa-bot",
                "bug",
                "2025-02-03 04:05:06",
                "2025-02-10",
                "https://github.com/project/tools/issues/7",
                "2025",
                "Feb",
                "QA",
                "TEAM",
                "Issue",
            ]
        );
    }

    #[test]
    fn test_pull_request_link() {
        let row = weekly_row("project/tools", &pr(5, None), &DigestConfig::default());
        assert_eq!(row.len(), WEEKLY_HEADER.len());
        assert_eq!(row[5], "https://github.com/project/tools/pull/5");
        assert_eq!(row[6], "PR");
    }

    #[test]
    fn test_issue_rows_sorted_by_number() {
        let issues = vec![
            issue(3, "a", "2025-01-01T00:00:00Z"),
            issue(9, "a", "2024-01-01T00:00:00Z"),
            issue(5, "a", "2026-01-01T00:00:00Z"),
        ];
        let rows = issue_rows("r", &issues, &DigestConfig::default());
        let numbers: Vec<&str> = rows.iter().map(|r| r.cells[1].as_str()).collect();
        assert_eq!(numbers, vec!["9", "5", "3"]);
    }

    #[test]
    fn test_combined_rows_sorted_by_created() {
        let config = DigestConfig::default();
        let first = issue_rows("a", &[issue(1, "x", "2025-01-01T00:00:00Z")], &config);
        let second = issue_rows(
            "b",
            &[
                issue(1, "x", "2025-03-01T00:00:00Z"),
                issue(2, "x", "2024-12-01T00:00:00Z"),
            ],
            &config,
        );
        let combined = combined_rows(first.into_iter().chain(second));
        let order: Vec<(&str, &str)> = combined
            .iter()
            .map(|r| (r.cells[0].as_str(), r.cells[1].as_str()))
            .collect();
        assert_eq!(order, vec![("b", "1"), ("a", "1"), ("b", "2")]);
    }

    #[test]
    fn test_merged_row() {
        let config = DigestConfig {
            web_base_url: "https://git.example.org/".to_string(),
            ..DigestConfig::default()
        };
        let row = merged_row("o/r", &pr(4, Some("2025-01-05T10:00:00Z")), &config);
        assert_eq!(row.len(), MERGED_HEADER.len());
        assert_eq!(row[4], "https://git.example.org/o/r/pull/4");
        assert_eq!(row[5], "2025-01-05");
        assert_eq!(merged_row("o/r", &pr(4, None), &config)[5], "N/A");
    }
}
