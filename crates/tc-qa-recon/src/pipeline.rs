//! End-to-end review and summary pipelines
//!
//! Both pipelines run only once every input is in memory. They produce report
//! content; rendering and writing it is the caller's job.

use std::collections::{BTreeMap, HashMap};

use crate::aggregate::{Aggregation, AggregatorConfig, RawResultRow, ResultAggregator};
use crate::definition::{CertStatus, DefinitionSource, status_breakdown};
use crate::delta::{DeltaEntry, SummaryCounts, compute_delta};
use crate::error::Result;
use crate::issue::{IssueKind, ReconciliationIssue};
use crate::reconcile::{SetDifference, reconcile};
use crate::scanner::StructuralScanner;
use crate::sheet::{MasterEntry, TestCaseSheet};
use crate::summary::Summary;

/// Outcome of reviewing a mapping file against the sheet
#[derive(Debug, Clone, Default)]
pub struct ReviewReport {
    /// Distinct ids in the sheet
    pub sheet_count: usize,
    /// Records in the mapping file
    pub definition_count: usize,
    /// Missing and extra ids
    pub difference: SetDifference,
    /// Records per status (`None` for empty or unknown)
    pub status_breakdown: BTreeMap<Option<CertStatus>, usize>,
    /// Every issue: set differences first, then scan issues in line order
    pub issues: Vec<ReconciliationIssue>,
}

impl ReviewReport {
    /// Issues of one kind, in report order
    pub fn issues_of(&self, kind: IssueKind) -> impl Iterator<Item = &ReconciliationIssue> {
        self.issues.iter().filter(move |issue| issue.kind() == kind)
    }

    /// Number of issues per kind
    #[must_use]
    pub fn issue_counts(&self) -> BTreeMap<IssueKind, usize> {
        let mut counts = BTreeMap::new();
        for issue in &self.issues {
            *counts.entry(issue.kind()).or_insert(0) += 1;
        }
        counts
    }

    /// Nothing to report
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Review a mapping file against the authoritative sheet
///
/// # Errors
///
/// Returns an error if the mapping file is not a JSON object.
pub fn review_definitions(
    definitions: &DefinitionSource,
    sheet: &TestCaseSheet,
) -> Result<ReviewReport> {
    let defined = definitions.test_case_ids()?;
    let records = definitions.records()?;
    let difference = reconcile(sheet.ids(), &defined);

    let mut issues = difference.to_issues(definitions);
    issues.extend(
        StructuralScanner::new()
            .with_sheet_statuses(sheet.statuses())
            .scan_source(definitions),
    );

    tracing::info!(
        sheet = sheet.len(),
        definitions = defined.len(),
        missing = difference.missing.len(),
        extra = difference.extra.len(),
        issues = issues.len(),
        "reviewed mapping file"
    );

    Ok(ReviewReport {
        sheet_count: sheet.len(),
        definition_count: defined.len(),
        status_breakdown: status_breakdown(&records),
        difference,
        issues,
    })
}

/// Outcome of summarizing execution results
#[derive(Debug, Clone, Default)]
pub struct ResultsReport {
    /// Aggregated counts with bookkeeping
    pub aggregation: Aggregation,
    /// New summary
    pub summary: Summary,
    /// Changes among tracked test cases since the previous summary
    pub delta: Vec<DeltaEntry>,
}

/// Aggregate results, build the summary and diff it against the previous one
#[must_use]
pub fn summarize_results(
    master: &[MasterEntry],
    rows: &[RawResultRow],
    previous: &HashMap<String, SummaryCounts>,
    config: AggregatorConfig,
) -> ResultsReport {
    let aggregation = ResultAggregator::new(config).aggregate(rows);
    let summary = Summary::build(master, &aggregation);
    let delta = compute_delta(previous, &summary.counts(), &summary.tracked_ids());

    tracing::info!(
        test_cases = summary.entries.len(),
        changed = delta.len(),
        "built summary"
    );

    ResultsReport {
        aggregation,
        summary,
        delta,
    }
}
