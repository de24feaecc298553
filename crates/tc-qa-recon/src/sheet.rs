//! Worksheet row views
//!
//! Worksheets arrive as `Vec<Vec<String>>` with the header in row 0. Column
//! numbers are 1-based, the way a spreadsheet user names them.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

fn cell(row: &[String], column: usize) -> Option<&str> {
    column
        .checked_sub(1)
        .and_then(|idx| row.get(idx))
        .map(|value| value.trim())
}

/// Columns of the authoritative test-case list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetColumns {
    /// Test case id column (default D)
    #[serde(default = "default_sheet_id_column")]
    pub id: usize,
    /// Certification status column (default F)
    #[serde(default = "default_sheet_status_column")]
    pub status: usize,
}

fn default_sheet_id_column() -> usize {
    4
}

fn default_sheet_status_column() -> usize {
    6
}

impl Default for SheetColumns {
    fn default() -> Self {
        Self {
            id: default_sheet_id_column(),
            status: default_sheet_status_column(),
        }
    }
}

/// Authoritative test-case list with the sheet's status column
#[derive(Debug, Clone, Default)]
pub struct TestCaseSheet {
    ids: HashSet<String>,
    statuses: HashMap<String, String>,
}

impl TestCaseSheet {
    /// Build from worksheet rows, skipping the header row
    ///
    /// Rows with an empty id are ignored. The status is recorded only when the
    /// row reaches the status column.
    #[must_use]
    pub fn from_rows(rows: &[Vec<String>], columns: SheetColumns) -> Self {
        let mut sheet = Self::default();
        for row in rows.iter().skip(1) {
            let Some(id) = cell(row, columns.id).filter(|id| !id.is_empty()) else {
                continue;
            };
            sheet.ids.insert(id.to_string());
            if let Some(status) = cell(row, columns.status) {
                sheet.statuses.insert(id.to_string(), status.to_string());
            }
        }
        sheet
    }

    /// Authoritative id set
    #[must_use]
    pub fn ids(&self) -> &HashSet<String> {
        &self.ids
    }

    /// Id → raw status as written in the sheet
    #[must_use]
    pub fn statuses(&self) -> &HashMap<String, String> {
        &self.statuses
    }

    /// Number of distinct ids
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// No ids at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Columns of the master test-case list used for the summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterListColumns {
    /// Test case id column (default A)
    #[serde(default = "default_master_id_column")]
    pub id: usize,
    /// Runs-required column (default B)
    #[serde(default = "default_runs_required_column")]
    pub runs_required: usize,
}

fn default_master_id_column() -> usize {
    1
}

fn default_runs_required_column() -> usize {
    2
}

impl Default for MasterListColumns {
    fn default() -> Self {
        Self {
            id: default_master_id_column(),
            runs_required: default_runs_required_column(),
        }
    }
}

/// One master list row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterEntry {
    /// Trimmed test case id
    pub id: String,
    /// Raw runs-required cell (may be empty)
    pub runs_required: String,
}

/// Master list entries in sheet order, header skipped, blank ids dropped
#[must_use]
pub fn master_list(rows: &[Vec<String>], columns: MasterListColumns) -> Vec<MasterEntry> {
    rows.iter()
        .skip(1)
        .filter_map(|row| {
            let id = cell(row, columns.id).filter(|id| !id.is_empty())?;
            Some(MasterEntry {
                id: id.to_string(),
                runs_required: cell(row, columns.runs_required)
                    .unwrap_or_default()
                    .to_string(),
            })
        })
        .collect()
}

/// Columns of the raw execution results worksheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultColumns {
    /// Participating company
    #[serde(default = "default_company_column")]
    pub company: usize,
    /// Device under test
    #[serde(default = "default_dut_column")]
    pub dut: usize,
    /// Test case id
    #[serde(default = "default_test_case_column")]
    pub test_case: usize,
    /// Outcome text
    #[serde(default = "default_outcome_column")]
    pub outcome: usize,
}

fn default_company_column() -> usize {
    3
}

fn default_dut_column() -> usize {
    4
}

fn default_test_case_column() -> usize {
    8
}

fn default_outcome_column() -> usize {
    9
}

impl Default for ResultColumns {
    fn default() -> Self {
        Self {
            company: default_company_column(),
            dut: default_dut_column(),
            test_case: default_test_case_column(),
            outcome: default_outcome_column(),
        }
    }
}

impl ResultColumns {
    /// Highest column a row must reach to be usable
    #[must_use]
    pub fn required_width(&self) -> usize {
        self.company
            .max(self.dut)
            .max(self.test_case)
            .max(self.outcome)
    }

    /// Cell at a 1-based column, trimmed
    #[must_use]
    pub fn cell<'r>(&self, row: &'r [String], column: usize) -> Option<&'r str> {
        cell(row, column)
    }
}
