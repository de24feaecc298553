//! Test-Case Reconciliation Core
//!
//! Cross-references a test-case mapping file against the authoritative
//! spreadsheet list, validates PICS tokens, rolls raw execution results up into
//! per-test-case counts, derives certification status and computes the delta
//! against the previous run.
//!
//! Everything here is a pure function over in-memory collections. Reading
//! worksheets and writing reports is left to `tc-qa-report`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
// Allow common patterns
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::must_use_candidate)]
// Allow common patterns in test code
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::redundant_clone))]

pub mod aggregate;
pub mod classify;
pub mod definition;
pub mod delta;
pub mod error;
pub mod issue;
pub mod pics;
pub mod pipeline;
pub mod reconcile;
pub mod scanner;
pub mod sheet;
pub mod summary;

pub use aggregate::{
    Aggregation, AggregatorConfig, DedupGranularity, Outcome, OutcomeCounts, RawResultRow,
    ResultAggregator, ResultRow,
};
pub use classify::{
    CertificationOutcome, DEFAULT_RUNS_REQUIRED, ReportSection, classify_certification,
    parse_runs_required, section_for,
};
pub use definition::{CertStatus, DefinitionSource, TestCaseRecord, status_breakdown};
pub use delta::{DeltaEntry, DeltaStatus, SummaryCounts, compute_delta};
pub use error::{Error, Result};
pub use issue::{IssueKind, ReconciliationIssue};
pub use pics::{PicsRule, PicsViolation, check_token, split_token_block, violations};
pub use pipeline::{ResultsReport, ReviewReport, review_definitions, summarize_results};
pub use reconcile::{SetDifference, reconcile};
pub use scanner::{ScanState, StructuralScanner};
pub use sheet::{
    MasterEntry, MasterListColumns, ResultColumns, SheetColumns, TestCaseSheet, master_list,
};
pub use summary::{Summary, SummaryEntry};
