//! Plain-text review log
//!
//! Counts first, then one section per issue group. Empty sections are left
//! out entirely.

use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};

use crate::error::Result;
use tc_qa_recon::{IssueKind, ReconciliationIssue, ReviewReport};

/// Issue groups in log order: (section title, kinds it collects)
const SECTIONS: &[(&str, &[IssueKind])] = &[
    ("--- Missing in JSON ---", &[IssueKind::MissingInDefinitions]),
    (
        "--- Extra in JSON (with line numbers + content) ---",
        &[IssueKind::ExtraInDefinitions],
    ),
    (
        "--- CertificationStatus Issues (Empty) ---",
        &[IssueKind::EmptyCertStatus],
    ),
    (
        "--- CertificationStatus vs cert Mismatches ---",
        &[IssueKind::CertFlagMismatch],
    ),
    (
        "--- Sheet vs JSON CertificationStatus Issues ---",
        &[IssueKind::SheetStatusMismatch, IssueKind::SheetFlagMismatch],
    ),
    (
        "--- PICS Invalid Character Issues ---",
        &[IssueKind::InvalidPicsToken],
    ),
];

/// `comparison_log_<YYYY-MM-DD_HH-MM-SS>.txt`
#[must_use]
pub fn log_file_name(timestamp: &NaiveDateTime) -> String {
    format!("comparison_log_{}.txt", timestamp.format("%Y-%m-%d_%H-%M-%S"))
}

fn section_lines(report: &ReviewReport, kinds: &[IssueKind]) -> Vec<String> {
    let issues = report
        .issues
        .iter()
        .filter(|issue| kinds.contains(&issue.kind()));

    if kinds.contains(&IssueKind::ExtraInDefinitions) {
        // Occurrences of all extra ids, in file order
        let mut hits: Vec<(usize, &str)> = issues
            .flat_map(|issue| match issue {
                ReconciliationIssue::ExtraInDefinitions { occurrences, .. } => occurrences
                    .iter()
                    .map(|(line, text)| (*line, text.as_str()))
                    .collect::<Vec<_>>(),
                _ => Vec::new(),
            })
            .collect();
        hits.sort_by_key(|(line, _)| *line);
        return hits
            .into_iter()
            .map(|(line, text)| format!("Line {line}: {text}"))
            .collect();
    }

    issues.flat_map(ReconciliationIssue::diagnostic_lines).collect()
}

/// Render the review log
#[must_use]
pub fn render_review_log(report: &ReviewReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Total test cases available in JSON: {}\n",
        report.definition_count
    ));
    out.push_str(&format!(
        "Total test cases available in Sheet: {}\n",
        report.sheet_count
    ));
    out.push_str(&format!(
        "Missing in JSON (present in Sheet only): {}\n",
        report.difference.missing.len()
    ));
    out.push_str(&format!(
        "Extra unwanted test cases in JSON (not in Sheet): {}\n",
        report.difference.extra.len()
    ));

    if !report.status_breakdown.is_empty() {
        out.push_str("CertificationStatus breakdown:\n");
        for (status, count) in &report.status_breakdown {
            let label = status.map_or("<empty or unknown>", |s| s.as_str());
            out.push_str(&format!("  {label}: {count}\n"));
        }
    }

    for (title, kinds) in SECTIONS {
        let lines = section_lines(report, kinds);
        if lines.is_empty() {
            continue;
        }
        out.push('\n');
        out.push_str(title);
        out.push('\n');
        for line in lines {
            out.push_str(&line);
            out.push('\n');
        }
    }
    out
}

/// Write the review log into `dir`, creating it if needed
///
/// # Errors
///
/// Returns an error if the directory or file cannot be written.
pub fn write_review_log(
    report: &ReviewReport,
    dir: impl AsRef<Path>,
    timestamp: &NaiveDateTime,
) -> Result<PathBuf> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;
    let path = dir.join(log_file_name(timestamp));
    std::fs::write(&path, render_review_log(report))?;
    tracing::debug!(path = %path.display(), "wrote review log");
    Ok(path)
}
