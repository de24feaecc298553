//! Delta between the previous and the new summary

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::aggregate::OutcomeCounts;

/// Counts as persisted on the summary sheet
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryCounts {
    /// Pass credits
    pub pass: u32,
    /// Fail credits
    pub fail: u32,
    /// Not-tested occurrences
    pub not_tested: u32,
    /// Total as written (not recomputed)
    pub total: u32,
}

impl From<OutcomeCounts> for SummaryCounts {
    fn from(counts: OutcomeCounts) -> Self {
        Self {
            pass: counts.pass,
            fail: counts.fail,
            not_tested: counts.not_tested,
            total: counts.total(),
        }
    }
}

/// How a tracked entry changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeltaStatus {
    /// More passes or failures, or a different not-tested count
    Updated,
    /// Fewer passes or failures
    Reduced,
    /// Anything else that differs (only the total)
    Changed,
}

impl std::fmt::Display for DeltaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Updated => write!(f, "Updated"),
            Self::Reduced => write!(f, "Reduced"),
            Self::Changed => write!(f, "Changed"),
        }
    }
}

impl DeltaStatus {
    /// Classify a change; the caller guarantees `old != new`
    #[must_use]
    pub fn classify(old: &SummaryCounts, new: &SummaryCounts) -> Self {
        if new.pass > old.pass || new.fail > old.fail || new.not_tested != old.not_tested {
            Self::Updated
        } else if new.pass < old.pass || new.fail < old.fail {
            Self::Reduced
        } else {
            Self::Changed
        }
    }
}

/// One changed tracked test case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaEntry {
    /// Test case id
    pub test_case: String,
    /// Counts from the previous run
    pub old: SummaryCounts,
    /// Counts from this run
    pub new: SummaryCounts,
    /// Classification
    pub status: DeltaStatus,
}

/// Entries for every tracked id whose counts changed, in tracked order
///
/// An id missing on either side counts as all zeros.
#[must_use]
pub fn compute_delta(
    old: &HashMap<String, SummaryCounts>,
    new: &HashMap<String, SummaryCounts>,
    tracked: &[String],
) -> Vec<DeltaEntry> {
    tracked
        .iter()
        .filter_map(|id| {
            let before = old.get(id).copied().unwrap_or_default();
            let after = new.get(id).copied().unwrap_or_default();
            (before != after).then(|| DeltaEntry {
                test_case: id.clone(),
                old: before,
                new: after,
                status: DeltaStatus::classify(&before, &after),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sc(pass: u32, fail: u32, not_tested: u32, total: u32) -> SummaryCounts {
        SummaryCounts {
            pass,
            fail,
            not_tested,
            total,
        }
    }

    fn map(entries: &[(&str, SummaryCounts)]) -> HashMap<String, SummaryCounts> {
        entries
            .iter()
            .map(|(id, c)| ((*id).to_string(), *c))
            .collect()
    }

    #[test]
    fn test_more_passes_is_updated() {
        let old = map(&[("TC1", sc(1, 0, 0, 1))]);
        let new = map(&[("TC1", sc(2, 0, 0, 2))]);
        let delta = compute_delta(&old, &new, &["TC1".to_string()]);
        assert_eq!(delta.len(), 1);
        assert_eq!(delta[0].status, DeltaStatus::Updated);
    }

    #[test]
    fn test_status_priority() {
        assert_eq!(
            DeltaStatus::classify(&sc(2, 0, 1, 3), &sc(1, 0, 2, 3)),
            DeltaStatus::Updated
        );
        assert_eq!(
            DeltaStatus::classify(&sc(2, 1, 0, 3), &sc(1, 1, 0, 2)),
            DeltaStatus::Reduced
        );
        assert_eq!(
            DeltaStatus::classify(&sc(1, 1, 0, 2), &sc(1, 1, 0, 5)),
            DeltaStatus::Changed
        );
    }

    #[test]
    fn test_unchanged_and_untracked_skipped() {
        let old = map(&[("TC1", sc(1, 0, 0, 1)), ("TC2", sc(0, 0, 0, 0))]);
        let new = map(&[("TC1", sc(1, 0, 0, 1)), ("TC2", sc(5, 0, 0, 5))]);
        assert!(compute_delta(&old, &new, &["TC1".to_string()]).is_empty());
    }

    #[test]
    fn test_missing_side_is_zero() {
        let new = map(&[("TC3", sc(0, 0, 2, 2))]);
        let delta = compute_delta(&HashMap::new(), &new, &["TC3".to_string()]);
        assert_eq!(delta[0].old, SummaryCounts::default());
        assert_eq!(delta[0].status, DeltaStatus::Updated);

        let gone = compute_delta(&new, &HashMap::new(), &["TC3".to_string()]);
        assert_eq!(gone[0].status, DeltaStatus::Updated);
    }

    #[test]
    fn test_from_outcome_counts() {
        let counts = OutcomeCounts {
            pass: 1,
            fail: 2,
            not_tested: 3,
        };
        assert_eq!(SummaryCounts::from(counts), sc(1, 2, 3, 6));
    }
}
