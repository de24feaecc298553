//! TC QA CLI Library
//!
//! Library functions for the `tc-qa` tool. Each `run_*` function covers one
//! subcommand and returns what `main` prints.

#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_const_for_fn)]
// Allow common patterns in test code
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod config;
pub mod error;

pub use config::{
    Config, DEFAULT_CONFIG_FILE, IssuesConfig, RepositoryConfig, ReviewConfig, SummaryConfig,
    WeeklyWorksheets,
};
pub use error::{CliError, Result};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::path::Path;
use tc_qa_issues::{
    ISSUE_HEADER, Issue, MERGED_HEADER, WEEKLY_HEADER, combined_rows, filter, issue_rows,
    load_issues, merged_between, merged_row, validate_range, weekly_buckets, weekly_row,
};
use tc_qa_recon::{DefinitionSource, PicsViolation, split_token_block, violations};
use tc_qa_report::{
    CsvWorkbook, ReportSink, ReviewJob, ReviewOutcome, SpreadsheetSource, SummaryOutcome, Table,
};

/// Cross-check the mapping file against the authoritative worksheet
pub fn run_review<S: SpreadsheetSource + ?Sized>(
    config: &Config,
    workbook: &S,
    timestamp: &NaiveDateTime,
) -> Result<ReviewOutcome> {
    let review = &config.review;
    let definitions = DefinitionSource::from_file(&review.mapping_file)?;
    let job = ReviewJob {
        worksheet: review.worksheet.clone(),
        columns: review.columns,
        log_dir: review.log_dir.clone(),
    };
    let outcome = job.run(workbook, &definitions, timestamp)?;
    tracing::info!(
        issues = outcome.report.issues.len(),
        log = %outcome.log_path.display(),
        "review finished"
    );
    Ok(outcome)
}

/// Rebuild the summary and delta worksheets
pub fn run_summary<W>(config: &Config, workbook: &mut W) -> Result<SummaryOutcome>
where
    W: SpreadsheetSource + ReportSink + ?Sized,
{
    let outcome = config.summary.job().run(workbook)?;
    if !outcome.styles_applied {
        tracing::warn!("summary written without full formatting");
    }
    Ok(outcome)
}

/// Open the configured workbook directory
pub fn open_workbook(config: &Config) -> Result<CsvWorkbook> {
    Ok(CsvWorkbook::open(&config.workbook)?)
}

/// Open the configured workbook directory, creating it if needed
pub fn create_workbook(config: &Config) -> Result<CsvWorkbook> {
    Ok(CsvWorkbook::create(&config.workbook)?)
}

/// Load one repository export, or `None` with a warning
fn load_export(export_dir: &Path, file: &Path, repository: &str) -> Option<Vec<Issue>> {
    let path = export_dir.join(file);
    match load_issues(&path) {
        Ok(issues) => Some(issues),
        Err(e) => {
            tracing::warn!(
                repository,
                path = %path.display(),
                error = %e,
                "skipping repository"
            );
            None
        }
    }
}

/// Worksheets written by an issue digest
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DigestOutcome {
    /// (worksheet, data rows) in write order
    pub worksheets: Vec<(String, usize)>,
    /// Repositories whose export could not be loaded
    pub skipped: Vec<String>,
}

impl DigestOutcome {
    fn write<W: ReportSink + ?Sized>(
        &mut self,
        sink: &mut W,
        worksheet: &str,
        table: &Table,
    ) -> Result<()> {
        sink.replace(worksheet, table)?;
        self.worksheets
            .push((worksheet.to_string(), table.len().saturating_sub(1)));
        Ok(())
    }
}

fn table_with_rows<const N: usize>(header: [&str; N], rows: Vec<Vec<String>>) -> Table {
    let mut table = Table::with_header(header);
    for row in rows {
        table.push_row(row);
    }
    table
}

/// Per-repository issue lists plus the combined list
pub fn run_issues<W: ReportSink + ?Sized>(config: &Config, sink: &mut W) -> Result<DigestOutcome> {
    let issues = &config.issues;
    let mut outcome = DigestOutcome::default();
    let mut all_rows = Vec::new();

    for repo in &issues.repositories {
        let Some(exported) = load_export(&issues.export_dir, &repo.issues_file(), &repo.name)
        else {
            outcome.skipped.push(repo.name.clone());
            continue;
        };
        let kept = filter(&exported, &issues.digest);
        let rows = issue_rows(&repo.name, &kept, &issues.digest);
        let table = table_with_rows(ISSUE_HEADER, rows.iter().map(|r| r.cells.clone()).collect());
        outcome.write(sink, &repo.worksheet(), &table)?;
        all_rows.extend(rows);
    }

    let combined = combined_rows(all_rows);
    let table = table_with_rows(ISSUE_HEADER, combined.into_iter().map(|r| r.cells).collect());
    outcome.write(sink, &issues.combined_worksheet, &table)?;
    Ok(outcome)
}

/// New, closed and open worksheets for the week ending at `now`
pub fn run_weekly<W: ReportSink + ?Sized>(
    config: &Config,
    sink: &mut W,
    now: DateTime<Utc>,
) -> Result<DigestOutcome> {
    let issues = &config.issues;
    let mut outcome = DigestOutcome::default();
    let (mut new, mut closed, mut open) = (Vec::new(), Vec::new(), Vec::new());

    for repo in &issues.repositories {
        let Some(exported) = load_export(&issues.export_dir, &repo.issues_file(), &repo.name)
        else {
            outcome.skipped.push(repo.name.clone());
            continue;
        };
        let buckets = weekly_buckets(&filter(&exported, &issues.digest), now);
        let row = |issue: &Issue| weekly_row(&repo.name, issue, &issues.digest);
        new.extend(buckets.new.iter().map(row));
        closed.extend(buckets.closed.iter().map(row));
        open.extend(buckets.open.iter().map(row));
    }

    let names = &issues.weekly;
    outcome.write(sink, &names.new, &table_with_rows(WEEKLY_HEADER, new))?;
    outcome.write(sink, &names.closed, &table_with_rows(WEEKLY_HEADER, closed))?;
    outcome.write(sink, &names.open, &table_with_rows(WEEKLY_HEADER, open))?;
    Ok(outcome)
}

/// Pull requests merged between `start` and `end`, both inclusive
pub fn run_merged<W: ReportSink + ?Sized>(
    config: &Config,
    sink: &mut W,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<DigestOutcome> {
    validate_range(start, end)?;
    let issues = &config.issues;
    let mut outcome = DigestOutcome::default();
    let mut rows = Vec::new();

    for repo in &issues.repositories {
        let Some(exported) = load_export(&issues.export_dir, &repo.pulls_file(), &repo.name)
        else {
            outcome.skipped.push(repo.name.clone());
            continue;
        };
        let merged = merged_between(&exported, start, end)?;
        if merged.is_empty() {
            tracing::info!(repository = %repo.name, %start, %end, "no merged pull requests");
        }
        rows.extend(
            merged
                .iter()
                .map(|pr| merged_row(&repo.name, pr, &issues.digest)),
        );
    }

    let table = table_with_rows(MERGED_HEADER, rows);
    outcome.write(sink, &issues.merged_worksheet, &table)?;
    Ok(outcome)
}

/// PICS sub-token with every rule it breaks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenReport {
    /// Sub-token as written
    pub token: String,
    /// Broken rules, empty when valid
    pub violations: Vec<PicsViolation>,
}

impl TokenReport {
    /// Token passes every rule
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Split each token block and check every sub-token
pub fn check_pics<S: AsRef<str>>(blocks: &[S]) -> Vec<TokenReport> {
    blocks
        .iter()
        .flat_map(|block| split_token_block(block.as_ref()))
        .map(|token| TokenReport {
            token: token.to_string(),
            violations: violations(token),
        })
        .collect()
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(s: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| format!("Invalid date '{s}' (expected YYYY-MM-DD): {e}"))
}
