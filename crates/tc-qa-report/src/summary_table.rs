//! Summary sheet layout
//!
//! ```text
//! Test Case Name | Pass Count | ... | Certification Status
//! ---- Not Executed Yet----
//! <entries or placeholder>
//!
//! ---- Pass Count < 3 ----
//! <entries or placeholder>
//!
//! ---- Passed Rule of Three ----
//! <entries or placeholder>
//! ```

use std::collections::HashMap;

use crate::table::Table;
use tc_qa_recon::{ReportSection, Summary, SummaryCounts, SummaryEntry};

/// Summary sheet header
pub const SUMMARY_HEADER: [&str; 8] = [
    "Test Case Name",
    "Pass Count",
    "Fail Count",
    "Not Tested Count",
    "Total",
    "Total Pass+Fail",
    "Number of runs required",
    "Certification Status",
];

fn entry_row(entry: &SummaryEntry) -> Vec<String> {
    vec![
        entry.test_case.clone(),
        entry.counts.pass.to_string(),
        entry.counts.fail.to_string(),
        entry.counts.not_tested.to_string(),
        entry.counts.total().to_string(),
        entry.counts.pass_fail().to_string(),
        entry.runs_required.to_string(),
        entry.certification.to_string(),
    ]
}

/// Lay out a summary as sheet rows
#[must_use]
pub fn summary_table(summary: &Summary) -> Table {
    let mut table = Table::with_header(SUMMARY_HEADER);
    for (idx, section) in ReportSection::ALL.iter().enumerate() {
        if idx > 0 {
            table.push_row([""]);
        }
        table.push_row([section.title()]);
        let mut entries = summary.section(*section).peekable();
        if entries.peek().is_none() {
            table.push_row([section.placeholder()]);
        }
        for entry in entries {
            table.push_row(entry_row(entry));
        }
    }
    table
}

/// Read counts back from a previously written summary sheet
///
/// Only rows after the header with at least five cells, a non-empty name and
/// an all-digit pass cell are entries; section labels, placeholders and blank
/// rows fall out. Rows whose remaining counts do not parse are skipped.
#[must_use]
pub fn parse_previous_summary(rows: &[Vec<String>]) -> HashMap<String, SummaryCounts> {
    rows.iter()
        .skip(1)
        .filter(|row| {
            row.len() >= 5
                && !row[0].is_empty()
                && !row[1].is_empty()
                && row[1].bytes().all(|b| b.is_ascii_digit())
        })
        .filter_map(|row| {
            let number = |idx: usize| row[idx].trim().parse::<u32>().ok();
            Some((
                row[0].clone(),
                SummaryCounts {
                    pass: number(1)?,
                    fail: number(2)?,
                    not_tested: number(3)?,
                    total: number(4)?,
                },
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tc_qa_recon::{MasterEntry, RawResultRow, ResultAggregator};

    fn summary(master: &[&str], rows: &[RawResultRow]) -> Summary {
        let master: Vec<_> = master
            .iter()
            .map(|id| MasterEntry {
                id: (*id).to_string(),
                runs_required: String::new(),
            })
            .collect();
        Summary::build(&master, &ResultAggregator::default().aggregate(rows))
    }

    #[test]
    fn test_layout_with_placeholders() {
        let table = summary_table(&summary(
            &["TC1", "TC2"],
            &[RawResultRow::new("C1", "D1", "TC2", "Pass")],
        ));
        let first_cells: Vec<_> = table.rows().iter().map(|r| r[0].as_str()).collect();
        assert_eq!(
            first_cells,
            vec![
                "Test Case Name",
                "---- Not Executed Yet----",
                "TC1",
                "",
                "---- Pass Count < 3 ----",
                "TC2",
                "",
                "---- Passed Rule of Three ----",
                "No remaining test cases",
            ]
        );
        assert_eq!(
            table.rows()[5],
            vec!["TC2", "1", "0", "0", "1", "1", "3", "Provisional"]
        );
    }

    #[test]
    fn test_empty_summary_has_all_placeholders() {
        let table = summary_table(&Summary::default());
        assert_eq!(table.len(), 9);
        assert_eq!(table.rows()[2], vec!["All test cases executed at least once"]);
        assert_eq!(table.rows()[5], vec!["No test cases with Pass Count < 3"]);
    }

    #[test]
    fn test_parse_previous_summary() {
        let rows: Vec<Vec<String>> = vec![
            vec!["Test Case Name", "Pass Count", "Fail Count", "Not Tested Count", "Total"],
            vec!["---- Not Executed Yet----"],
            vec!["TC1", "0", "0", "2", "2", "0", "3", "Provisional"],
            vec!["TC2", "x", "0", "0", "0"],
            vec!["TC3", "1", "bad", "0", "1"],
            vec!["", "1", "0", "0", "1"],
            vec!["TC4", "4", "1", "0", "5"],
        ]
        .into_iter()
        .map(|r| r.into_iter().map(String::from).collect())
        .collect();

        let parsed = parse_previous_summary(&rows);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed["TC1"].not_tested, 2);
        assert_eq!(parsed["TC4"].total, 5);
    }

    #[test]
    fn test_written_table_parses_back() {
        let built = summary(
            &["TC1", "TC2", "TC3"],
            &[
                RawResultRow::new("C1", "D1", "TC2", "Pass"),
                RawResultRow::new("C1", "D1", "TC3", "Not Tested"),
            ],
        );
        let parsed = parse_previous_summary(summary_table(&built).rows());
        assert_eq!(parsed, built.counts());
    }
}
