//! Review and summary jobs over a workbook
//!
//! A job reads its inputs through [`SpreadsheetSource`], runs the matching
//! core pipeline and writes the results back. Missing input worksheets are
//! fatal. A missing summary or delta worksheet just means there is no previous
//! run. Formatting failures are logged and reported in the outcome.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::delta_table::delta_table;
use crate::error::{Error, Result};
use crate::review_log::write_review_log;
use crate::style::{delta_intents, reset_intents, section_intents};
use crate::summary_table::{parse_previous_summary, summary_table};
use crate::workbook::{ReportSink, SpreadsheetSource, try_apply_styles};
use tc_qa_recon::{
    AggregatorConfig, DefinitionSource, MasterListColumns, RawResultRow, ResultColumns,
    ResultsReport, ReviewReport, SheetColumns, TestCaseSheet, master_list, review_definitions,
    summarize_results,
};

/// Rows of a worksheet, or nothing if it does not exist yet
fn rows_or_empty<S: SpreadsheetSource + ?Sized>(
    source: &S,
    worksheet: &str,
) -> Result<Vec<Vec<String>>> {
    match source.rows(worksheet) {
        Ok(rows) => Ok(rows),
        Err(Error::WorksheetNotFound(_)) => {
            tracing::info!(worksheet, "worksheet not found, treating as empty");
            Ok(Vec::new())
        }
        Err(e) => Err(e),
    }
}

fn header_width(rows: &[Vec<String>]) -> usize {
    rows.first().map_or(0, Vec::len)
}

/// Cross-check a mapping file against the authoritative worksheet
#[derive(Debug, Clone)]
pub struct ReviewJob {
    /// Worksheet holding the authoritative list
    pub worksheet: String,
    /// Id and status columns
    pub columns: SheetColumns,
    /// Directory for the review log
    pub log_dir: PathBuf,
}

/// Review result and where its log went
#[derive(Debug, Clone)]
pub struct ReviewOutcome {
    /// Review content
    pub report: ReviewReport,
    /// Written log file
    pub log_path: PathBuf,
}

impl ReviewJob {
    /// Run the review and write the log
    ///
    /// # Errors
    ///
    /// Returns an error if the worksheet is missing, the mapping file is not a
    /// JSON object, or the log cannot be written.
    pub fn run<S: SpreadsheetSource + ?Sized>(
        &self,
        source: &S,
        definitions: &DefinitionSource,
        timestamp: &NaiveDateTime,
    ) -> Result<ReviewOutcome> {
        let rows = source.rows(&self.worksheet)?;
        let sheet = TestCaseSheet::from_rows(&rows, self.columns);
        let report = review_definitions(definitions, &sheet)?;
        let log_path = write_review_log(&report, &self.log_dir, timestamp)?;
        Ok(ReviewOutcome { report, log_path })
    }
}

/// Worksheet names used by the summary job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryWorksheets {
    /// Raw execution results
    #[serde(default = "default_results_worksheet")]
    pub results: String,
    /// Master test-case list
    #[serde(default = "default_master_worksheet")]
    pub master: String,
    /// Summary output
    #[serde(default = "default_summary_worksheet")]
    pub summary: String,
    /// Delta output
    #[serde(default = "default_delta_worksheet")]
    pub delta: String,
}

fn default_results_worksheet() -> String {
    "Results".to_string()
}

fn default_master_worksheet() -> String {
    "TC_List".to_string()
}

fn default_summary_worksheet() -> String {
    "Summary".to_string()
}

fn default_delta_worksheet() -> String {
    "Summary Changes".to_string()
}

impl Default for SummaryWorksheets {
    fn default() -> Self {
        Self {
            results: default_results_worksheet(),
            master: default_master_worksheet(),
            summary: default_summary_worksheet(),
            delta: default_delta_worksheet(),
        }
    }
}

/// Aggregate results into the summary and delta worksheets
#[derive(Debug, Clone, Default)]
pub struct SummaryJob {
    /// Worksheet names
    pub worksheets: SummaryWorksheets,
    /// Master list columns
    pub master_columns: MasterListColumns,
    /// Result worksheet columns
    pub result_columns: ResultColumns,
    /// Aggregation settings
    pub aggregator: AggregatorConfig,
}

/// Summary result
#[derive(Debug, Clone)]
pub struct SummaryOutcome {
    /// Aggregation, summary and delta
    pub report: ResultsReport,
    /// All formatting was applied
    pub styles_applied: bool,
}

impl SummaryJob {
    /// Run the job
    ///
    /// The summary worksheet is written before the delta worksheet; a failure
    /// writing the delta leaves the new summary in place.
    ///
    /// # Errors
    ///
    /// Returns an error if an input worksheet is missing or an output
    /// worksheet cannot be written.
    pub fn run<W>(&self, workbook: &mut W) -> Result<SummaryOutcome>
    where
        W: SpreadsheetSource + ReportSink + ?Sized,
    {
        let names = &self.worksheets;
        let previous_summary = rows_or_empty(workbook, &names.summary)?;
        let previous_delta = rows_or_empty(workbook, &names.delta)?;
        let previous = parse_previous_summary(&previous_summary);

        let master = master_list(&workbook.rows(&names.master)?, self.master_columns);
        let raw_rows: Vec<RawResultRow> = workbook
            .rows(&names.results)?
            .iter()
            .skip(1)
            .map(|cells| RawResultRow::from_cells(cells, &self.result_columns))
            .collect();

        let report = summarize_results(&master, &raw_rows, &previous, self.aggregator);

        let summary = summary_table(&report.summary);
        workbook.replace(&names.summary, &summary)?;
        let mut intents = reset_intents(
            previous_summary.len().max(summary.len()),
            header_width(&previous_summary).max(summary.width()),
        );
        intents.extend(section_intents(&summary));
        let summary_styled = try_apply_styles(workbook, &names.summary, &intents);

        let delta = delta_table(&report.delta);
        workbook.replace(&names.delta, &delta)?;
        let mut intents = reset_intents(
            previous_delta.len().max(delta.len()),
            header_width(&previous_delta).max(delta.width()),
        );
        intents.extend(delta_intents(&delta));
        let delta_styled = try_apply_styles(workbook, &names.delta, &intents);

        Ok(SummaryOutcome {
            report,
            styles_applied: summary_styled && delta_styled,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delta_table::NO_CHANGES_MESSAGE;
    use crate::style::Color;
    use crate::workbook::{CsvWorkbook, MemoryWorkbook};
    use chrono::NaiveDate;

    fn results_rows() -> Vec<Vec<&'static str>> {
        vec![
            vec!["#", "Date", "Company", "DUT", "", "", "", "Test Case", "Result"],
            vec!["1", "", "C1", "D1", "", "", "", "TC1", "Pass"],
            vec!["2", "", "C1", "D1", "", "", "", "TC1", "Pass"],
            vec!["3", "", "C1", "D2", "", "", "", "TC1", "Fail"],
            vec!["4", "", "C2", "D7", "", "", "", "TC2", "Pass"],
            vec!["5", "", "", "D7", "", "", "", "TC2", "Pass"],
        ]
    }

    fn workbook() -> MemoryWorkbook {
        MemoryWorkbook::new()
            .with_sheet("TC_List", [["Test Case", "Runs"], ["TC1", ""], ["TC2", "1"], ["TC3", ""]])
            .with_sheet("Results", results_rows())
    }

    #[test]
    fn test_summary_job_first_run() {
        let mut book = workbook();
        let outcome = SummaryJob::default().run(&mut book).expect("run");
        assert!(outcome.styles_applied);
        assert_eq!(outcome.report.aggregation.duplicates_removed, 1);
        assert_eq!(outcome.report.aggregation.malformed_dropped, 1);

        let summary = book.sheet("Summary").expect("summary written");
        assert_eq!(summary[0][0], "Test Case Name");
        assert_eq!(summary[1][0], "---- Not Executed Yet----");
        assert_eq!(summary[2][0], "TC3");

        let section_rows: Vec<_> = book
            .styles("Summary")
            .iter()
            .filter(|i| i.background == Some(Color::YELLOW))
            .map(|i| i.range.first_row)
            .collect();
        assert_eq!(section_rows, vec![2, 5, 8]);

        let delta = book.sheet("Summary Changes").expect("delta written");
        assert_eq!(delta[0][0], "Test Case Name");
        assert_eq!(delta[1][0], "TC1");
        assert_eq!(delta[1][9], "Updated");
    }

    #[test]
    fn test_summary_job_second_run_has_no_changes() {
        let mut book = workbook();
        let job = SummaryJob::default();
        let first = job.run(&mut book).expect("first run");
        let summary_after_first = book.sheet("Summary").map(<[_]>::to_vec);

        let second = job.run(&mut book).expect("second run");
        assert_eq!(first.report.summary, second.report.summary);
        assert!(second.report.delta.is_empty());
        assert_eq!(book.sheet("Summary").map(<[_]>::to_vec), summary_after_first);
        assert_eq!(
            book.sheet("Summary Changes"),
            Some(&[vec![NO_CHANGES_MESSAGE.to_string()]][..])
        );
    }

    #[test]
    fn test_missing_input_is_fatal() {
        let mut book = MemoryWorkbook::new().with_sheet("TC_List", [["Test Case"]]);
        let err = SummaryJob::default().run(&mut book).expect_err("no results sheet");
        assert!(matches!(err, Error::WorksheetNotFound(name) if name == "Results"));
        assert!(book.sheet("Summary").is_none());
    }

    #[test]
    fn test_style_failure_does_not_abort() {
        let mut book = workbook().with_style_failure();
        let outcome = SummaryJob::default().run(&mut book).expect("run");
        assert!(!outcome.styles_applied);
        assert!(book.sheet("Summary").is_some());
        assert!(book.sheet("Summary Changes").is_some());
    }

    #[test]
    fn test_review_job_on_csv_workbook() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut book = CsvWorkbook::create(dir.path().join("book")).expect("workbook");
        let mut list = crate::table::Table::with_header(["#", "Cluster", "Area", "Test Case", "", "Status"]);
        list.push_row(["1", "OnOff", "", "TC-OO-2.1", "", "Executable"]);
        book.replace("TC Mapping", &list).expect("seed list");

        let definitions = DefinitionSource::new(
            r#"{
  "TC-OO-2.1": {
    "CertificationStatus": "Executable",
    "cert": "true",
    "PICS": ["OO.S"]
  }
}"#,
        );
        let job = ReviewJob {
            worksheet: "TC Mapping".to_string(),
            columns: SheetColumns::default(),
            log_dir: dir.path().join("logs"),
        };
        let timestamp = NaiveDate::from_ymd_opt(2025, 1, 2)
            .and_then(|d| d.and_hms_opt(3, 4, 5))
            .expect("timestamp");
        let outcome = job.run(&book, &definitions, &timestamp).expect("review");
        assert!(outcome.report.is_clean());
        assert!(outcome.log_path.ends_with("comparison_log_2025-01-02_03-04-05.txt"));
        assert!(outcome.log_path.exists());
    }

    #[test]
    fn test_worksheet_names_defaults() {
        let names: SummaryWorksheets =
            serde_json::from_str(r#"{"results": "1.5_SVE_Results"}"#).expect("parse");
        assert_eq!(names.results, "1.5_SVE_Results");
        assert_eq!(names.delta, "Summary Changes");
    }
}
