//! Certification classification
//!
//! Two independent rules run over the same counts. The certification outcome
//! compares passes against the runs required. The report section also looks at
//! failures, so a test case with zero passes and some failures lands in
//! `LowPass` while still being `Provisional`. Both are kept and reported side
//! by side.

use serde::{Deserialize, Serialize};

use crate::aggregate::OutcomeCounts;

/// Runs required when the master list leaves the cell blank or unusable
pub const DEFAULT_RUNS_REQUIRED: u32 = 3;

/// Parse a runs-required cell, falling back to [`DEFAULT_RUNS_REQUIRED`]
///
/// Empty, non-numeric and zero values use the default.
#[must_use]
pub fn parse_runs_required(raw: &str) -> u32 {
    match raw.trim().parse::<u32>() {
        Ok(0) | Err(_) => DEFAULT_RUNS_REQUIRED,
        Ok(n) => n,
    }
}

/// Derived certification outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CertificationOutcome {
    /// Enough passing runs
    Certifiable,
    /// Not enough passing runs yet
    Provisional,
    /// Single-run test case that has not passed yet
    NewChangesProvisional,
}

impl std::fmt::Display for CertificationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Certifiable => write!(f, "Certifiable"),
            Self::Provisional => write!(f, "Provisional"),
            Self::NewChangesProvisional => write!(f, "New Changes - Provisional"),
        }
    }
}

/// Certification outcome from pass count and runs required
#[must_use]
pub fn classify_certification(pass: u32, runs_required: u32) -> CertificationOutcome {
    if runs_required == 1 {
        if pass >= 1 {
            CertificationOutcome::Certifiable
        } else {
            CertificationOutcome::NewChangesProvisional
        }
    } else if pass >= runs_required {
        CertificationOutcome::Certifiable
    } else {
        CertificationOutcome::Provisional
    }
}

/// Summary sheet section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReportSection {
    /// Neither passed nor failed anywhere
    NotExecuted,
    /// Fewer passes than required
    LowPass,
    /// Enough passes
    Passed,
}

impl ReportSection {
    /// Sections in the order they appear on the summary sheet
    pub const ALL: [Self; 3] = [Self::NotExecuted, Self::LowPass, Self::Passed];

    /// Section header row label
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::NotExecuted => "---- Not Executed Yet----",
            Self::LowPass => "---- Pass Count < 3 ----",
            Self::Passed => "---- Passed Rule of Three ----",
        }
    }

    /// Row written when the section has no entries
    #[must_use]
    pub const fn placeholder(&self) -> &'static str {
        match self {
            Self::NotExecuted => "All test cases executed at least once",
            Self::LowPass => "No test cases with Pass Count < 3",
            Self::Passed => "No remaining test cases",
        }
    }

    /// Entries of this section feed the delta report
    #[must_use]
    pub const fn is_tracked(&self) -> bool {
        matches!(self, Self::NotExecuted | Self::LowPass)
    }
}

/// Section for a test case's counts
#[must_use]
pub fn section_for(counts: &OutcomeCounts, runs_required: u32) -> ReportSection {
    if counts.pass == 0 && counts.fail == 0 {
        ReportSection::NotExecuted
    } else if counts.pass < runs_required {
        ReportSection::LowPass
    } else {
        ReportSection::Passed
    }
}
