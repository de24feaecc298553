//! Structural scan of a mapping file
//!
//! Single pass over the raw lines. The scan is a fold over [`ScanState`]: the
//! current record id changes only when a line opens an object-valued key, and
//! every issue is attributed to the most recently opened record.
//!
//! Checks per line:
//! - empty `CertificationStatus`
//! - status/flag agreement (the flag must be on the next line)
//! - sheet status vs. mapping file status, and the flag the sheet implies
//! - every PICS sub-token inside a `"PICS": [ ... ]` block

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

use crate::definition::{CertStatus, DefinitionSource};
use crate::issue::ReconciliationIssue;
use crate::pics::{check_token, split_token_block};

/// `"<key>": {` opens a record
static RECORD_OPEN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r#"^\s*"([^"]+)":\s*\{"#).unwrap()
});

static STATUS_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r#""CertificationStatus":\s*"([^"]*)""#).unwrap()
});

static PICS_OPEN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r#""PICS":\s*\["#).unwrap()
});

static QUOTED_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r#""([^"]*)""#).unwrap()
});

/// Accumulator threaded through the line fold
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanState {
    /// Most recently opened record
    pub current_record: Option<String>,
    /// Inside a `"PICS": [` block
    pub in_pics_block: bool,
}

/// Position of the first `]` outside a quoted string
fn unquoted_close(text: &str) -> Option<usize> {
    let mut in_quote = false;
    let mut escaped = false;
    for (idx, c) in text.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_quote => escaped = true,
            '"' => in_quote = !in_quote,
            ']' if !in_quote => return Some(idx),
            _ => {}
        }
    }
    None
}

/// Next line as the flag check sees it: trimmed, trailing commas removed
fn flag_line<'l>(lines: &[&'l str], idx: usize) -> Option<&'l str> {
    lines
        .get(idx + 1)
        .map(|next| next.trim().trim_end_matches(','))
}

/// Line-oriented mapping file scanner
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralScanner<'a> {
    sheet_statuses: Option<&'a HashMap<String, String>>,
}

impl<'a> StructuralScanner<'a> {
    /// Scanner without sheet cross-checks
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cross-check statuses against the sheet's id → status column
    #[must_use]
    pub fn with_sheet_statuses(mut self, statuses: &'a HashMap<String, String>) -> Self {
        self.sheet_statuses = Some(statuses);
        self
    }

    /// Scan a loaded mapping file
    #[must_use]
    pub fn scan_source(&self, source: &DefinitionSource) -> Vec<ReconciliationIssue> {
        self.scan(&source.lines())
    }

    /// Scan raw lines, returning issues in source order
    #[must_use]
    pub fn scan(&self, lines: &[&str]) -> Vec<ReconciliationIssue> {
        let mut issues = Vec::new();
        let final_state = (0..lines.len()).fold(ScanState::default(), |state, idx| {
            self.scan_line(state, lines, idx, &mut issues)
        });
        if final_state.in_pics_block {
            tracing::debug!(
                record = final_state.current_record.as_deref().unwrap_or("<none>"),
                "PICS block not closed at end of file"
            );
        }
        issues
    }

    /// One fold step
    pub fn scan_line(
        &self,
        mut state: ScanState,
        lines: &[&str],
        idx: usize,
        issues: &mut Vec<ReconciliationIssue>,
    ) -> ScanState {
        let line = lines[idx];

        if let Some(caps) = RECORD_OPEN_REGEX.captures(line) {
            state.current_record = Some(caps[1].to_string());
        }

        if let Some(caps) = STATUS_REGEX.captures(line) {
            self.check_status(&state, lines, idx, &caps[1], issues);
        }

        let block_text = if state.in_pics_block {
            Some(line)
        } else if let Some(open) = PICS_OPEN_REGEX.find(line) {
            state.in_pics_block = true;
            Some(&line[open.end()..])
        } else {
            None
        };

        if let Some(text) = block_text {
            let body = match unquoted_close(text) {
                Some(close) => {
                    state.in_pics_block = false;
                    &text[..close]
                }
                None => text,
            };
            check_pics_body(body, idx + 1, &state, issues);
        }

        state
    }

    fn check_status(
        &self,
        state: &ScanState,
        lines: &[&str],
        idx: usize,
        value: &str,
        issues: &mut Vec<ReconciliationIssue>,
    ) {
        let number = idx + 1;
        let record_id = || state.current_record.clone();

        if value.is_empty() {
            issues.push(ReconciliationIssue::EmptyCertStatus {
                line: number,
                record_id: record_id(),
            });
            return;
        }

        let next = flag_line(lines, idx);

        if let Some(status) = CertStatus::parse(value) {
            let expected = status.expected_flag_line();
            if !next.is_some_and(|n| n.contains(&expected)) {
                issues.push(ReconciliationIssue::CertFlagMismatch {
                    line: number + 1,
                    record_id: record_id(),
                    status,
                    expected,
                    found: next.unwrap_or_default().to_string(),
                });
            }
        }

        let sheet_status = self
            .sheet_statuses
            .zip(state.current_record.as_deref())
            .and_then(|(statuses, id)| statuses.get(id))
            .and_then(|raw| CertStatus::parse(raw.trim()));

        if let Some(sheet_status) = sheet_status {
            if sheet_status.as_str() != value {
                issues.push(ReconciliationIssue::SheetStatusMismatch {
                    line: number,
                    record_id: record_id(),
                    sheet_status,
                    definition_status: value.to_string(),
                });
            }
            let expected = sheet_status.expected_flag_line();
            if !next.is_some_and(|n| n.contains(&expected)) {
                issues.push(ReconciliationIssue::SheetFlagMismatch {
                    line: number + 1,
                    record_id: record_id(),
                    sheet_status,
                    expected,
                    found: next.unwrap_or_default().to_string(),
                });
            }
        }
    }
}

fn check_pics_body(
    body: &str,
    number: usize,
    state: &ScanState,
    issues: &mut Vec<ReconciliationIssue>,
) {
    for caps in QUOTED_REGEX.captures_iter(body) {
        for token in split_token_block(&caps[1]) {
            if let Err(violation) = check_token(token) {
                issues.push(ReconciliationIssue::InvalidPicsToken {
                    line: number,
                    record_id: state.current_record.clone(),
                    token: token.to_string(),
                    rule: violation.rule,
                });
            }
        }
    }
}
