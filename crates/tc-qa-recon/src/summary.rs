//! Per test case summary built from the master list and the aggregation

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::aggregate::{Aggregation, OutcomeCounts};
use crate::classify::{
    CertificationOutcome, ReportSection, classify_certification, parse_runs_required, section_for,
};
use crate::delta::SummaryCounts;
use crate::sheet::MasterEntry;

/// One summary row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryEntry {
    /// Test case id
    pub test_case: String,
    /// Aggregated counts
    pub counts: OutcomeCounts,
    /// Runs required after defaulting
    pub runs_required: u32,
    /// Certification outcome
    pub certification: CertificationOutcome,
    /// Summary sheet section
    pub section: ReportSection,
}

/// Summary in master list order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Entries, one per distinct master list id
    pub entries: Vec<SummaryEntry>,
}

impl Summary {
    /// Walk the master list and attach counts and classifications
    #[must_use]
    pub fn build(master: &[MasterEntry], aggregation: &Aggregation) -> Self {
        let mut seen = HashSet::new();
        let entries = master
            .iter()
            .filter_map(|entry| {
                let id = entry.id.trim();
                if id.is_empty() || !seen.insert(id.to_string()) {
                    return None;
                }
                let counts = aggregation.counts_for(id);
                let runs_required = parse_runs_required(&entry.runs_required);
                Some(SummaryEntry {
                    test_case: id.to_string(),
                    counts,
                    runs_required,
                    certification: classify_certification(counts.pass, runs_required),
                    section: section_for(&counts, runs_required),
                })
            })
            .collect();
        Self { entries }
    }

    /// Entries of one section, in master list order
    pub fn section(&self, section: ReportSection) -> impl Iterator<Item = &SummaryEntry> {
        self.entries.iter().filter(move |e| e.section == section)
    }

    /// Ids the delta report follows: NotExecuted first, then LowPass
    #[must_use]
    pub fn tracked_ids(&self) -> Vec<String> {
        ReportSection::ALL
            .iter()
            .filter(|section| section.is_tracked())
            .flat_map(|section| self.section(*section))
            .map(|entry| entry.test_case.clone())
            .collect()
    }

    /// Id → counts, in the shape persisted on the summary sheet
    #[must_use]
    pub fn counts(&self) -> HashMap<String, SummaryCounts> {
        self.entries
            .iter()
            .map(|entry| (entry.test_case.clone(), SummaryCounts::from(entry.counts)))
            .collect()
    }
}
