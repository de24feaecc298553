//! Result aggregation
//!
//! Raw execution rows are normalized, exact duplicates are dropped and the
//! remaining rows are rolled up per test case. At the default company
//! granularity a company earns at most one pass credit and one fail credit per
//! test case, however many of its devices ran it. Not-tested rows count per
//! occurrence.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::sheet::ResultColumns;

/// Normalized execution outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Outcome {
    /// Test passed
    Pass,
    /// Test failed
    Fail,
    /// Test was not run
    NotTested,
}

impl Outcome {
    /// Trim and case-fold a raw outcome cell
    #[must_use]
    pub fn normalize(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "pass" => Some(Self::Pass),
            "fail" => Some(Self::Fail),
            "not tested" | "nottested" | "not_tested" | "not-tested" => Some(Self::NotTested),
            _ => None,
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pass => write!(f, "Pass"),
            Self::Fail => write!(f, "Fail"),
            Self::NotTested => write!(f, "Not Tested"),
        }
    }
}

/// Result row as read from the worksheet, before validation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawResultRow {
    /// Participating company
    pub company: String,
    /// Device under test
    pub dut: String,
    /// Test case id
    pub test_case: String,
    /// Raw outcome text
    pub outcome: String,
}

impl RawResultRow {
    /// Convenience constructor
    pub fn new(
        company: impl Into<String>,
        dut: impl Into<String>,
        test_case: impl Into<String>,
        outcome: impl Into<String>,
    ) -> Self {
        Self {
            company: company.into(),
            dut: dut.into(),
            test_case: test_case.into(),
            outcome: outcome.into(),
        }
    }

    /// Pick the configured cells out of a worksheet row; absent cells are empty
    #[must_use]
    pub fn from_cells(cells: &[String], columns: &ResultColumns) -> Self {
        let pick = |column| columns.cell(cells, column).unwrap_or_default().to_string();
        Self {
            company: pick(columns.company),
            dut: pick(columns.dut),
            test_case: pick(columns.test_case),
            outcome: pick(columns.outcome),
        }
    }

    /// Validated row, `None` when an id is blank or the outcome is unknown
    #[must_use]
    pub fn normalize(&self) -> Option<ResultRow> {
        let company = self.company.trim();
        let dut = self.dut.trim();
        let test_case = self.test_case.trim();
        if company.is_empty() || dut.is_empty() || test_case.is_empty() {
            return None;
        }
        Some(ResultRow {
            company: company.to_string(),
            dut: dut.to_string(),
            test_case: test_case.to_string(),
            outcome: Outcome::normalize(&self.outcome)?,
        })
    }
}

/// Validated result row; exact duplicates compare equal
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResultRow {
    /// Participating company
    pub company: String,
    /// Device under test
    pub dut: String,
    /// Test case id
    pub test_case: String,
    /// Outcome
    pub outcome: Outcome,
}

/// Per test case counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeCounts {
    /// Pass credits
    pub pass: u32,
    /// Fail credits
    pub fail: u32,
    /// Not-tested occurrences
    pub not_tested: u32,
}

impl OutcomeCounts {
    /// `pass + fail + not_tested`
    #[must_use]
    pub fn total(&self) -> u32 {
        self.pass + self.fail + self.not_tested
    }

    /// `pass + fail`
    #[must_use]
    pub fn pass_fail(&self) -> u32 {
        self.pass + self.fail
    }
}

/// How pass/fail credits are deduplicated across devices
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupGranularity {
    /// One pass and one fail credit per company per test case
    #[default]
    Company,
    /// One credit per distinct device
    Device,
}

/// Aggregator configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatorConfig {
    /// Credit granularity
    #[serde(default)]
    pub granularity: DedupGranularity,
}

/// Aggregation result with the bookkeeping printed after a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregation {
    /// Test case id → counts
    pub counts: BTreeMap<String, OutcomeCounts>,
    /// Rows seen
    pub rows_read: usize,
    /// Exact duplicate rows dropped
    pub duplicates_removed: usize,
    /// Rows with a blank id or unknown outcome
    pub malformed_dropped: usize,
}

impl Aggregation {
    /// Counts for one test case, zero when it never ran
    #[must_use]
    pub fn counts_for(&self, test_case: &str) -> OutcomeCounts {
        self.counts.get(test_case).copied().unwrap_or_default()
    }
}

#[derive(Debug, Default)]
struct CompanyGroup {
    passing: HashSet<String>,
    failing: HashSet<String>,
    not_tested: u32,
}

/// Rolls raw rows up into per test case counts
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultAggregator {
    config: AggregatorConfig,
}

impl ResultAggregator {
    /// Create an aggregator
    #[must_use]
    pub fn new(config: AggregatorConfig) -> Self {
        Self { config }
    }

    /// Aggregate rows
    pub fn aggregate<'r, I>(&self, rows: I) -> Aggregation
    where
        I: IntoIterator<Item = &'r RawResultRow>,
    {
        let mut aggregation = Aggregation::default();
        let mut seen = HashSet::new();
        let mut groups: BTreeMap<(String, String), CompanyGroup> = BTreeMap::new();

        for raw in rows {
            aggregation.rows_read += 1;
            let Some(row) = raw.normalize() else {
                aggregation.malformed_dropped += 1;
                continue;
            };
            if !seen.insert(row.clone()) {
                aggregation.duplicates_removed += 1;
                continue;
            }
            let group = groups
                .entry((row.company, row.test_case))
                .or_default();
            match row.outcome {
                Outcome::Pass => {
                    group.passing.insert(row.dut);
                }
                Outcome::Fail => {
                    group.failing.insert(row.dut);
                }
                Outcome::NotTested => group.not_tested += 1,
            }
        }

        for ((_, test_case), group) in groups {
            let counts = aggregation.counts.entry(test_case).or_default();
            let (pass, fail) = match self.config.granularity {
                DedupGranularity::Company => (
                    u32::from(!group.passing.is_empty()),
                    u32::from(!group.failing.is_empty()),
                ),
                DedupGranularity::Device => (
                    u32::try_from(group.passing.len()).unwrap_or(u32::MAX),
                    u32::try_from(group.failing.len()).unwrap_or(u32::MAX),
                ),
            };
            counts.pass += pass;
            counts.fail += fail;
            counts.not_tested += group.not_tested;
        }

        tracing::info!(
            rows = aggregation.rows_read,
            duplicates = aggregation.duplicates_removed,
            malformed = aggregation.malformed_dropped,
            test_cases = aggregation.counts.len(),
            "aggregated execution results"
        );
        aggregation
    }
}
