//! Set reconciliation between the sheet's id list and the mapping file keys

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::definition::DefinitionSource;
use crate::issue::ReconciliationIssue;

/// Symmetric difference between the authoritative and defined id sets
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetDifference {
    /// In the sheet, not in the mapping file (sorted)
    pub missing: Vec<String>,
    /// In the mapping file, not in the sheet (sorted)
    pub extra: Vec<String>,
}

impl SetDifference {
    /// Both sides agree
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.extra.is_empty()
    }

    /// Convert into issues, attaching the source lines of every extra id
    #[must_use]
    pub fn to_issues(&self, source: &DefinitionSource) -> Vec<ReconciliationIssue> {
        let missing = self
            .missing
            .iter()
            .map(|id| ReconciliationIssue::MissingInDefinitions { id: id.clone() });
        let extra = self
            .extra
            .iter()
            .map(|id| ReconciliationIssue::ExtraInDefinitions {
                id: id.clone(),
                occurrences: source.occurrences(id),
            });
        missing.chain(extra).collect()
    }
}

/// Compute `authoritative − defined` and `defined − authoritative`
#[must_use]
pub fn reconcile(authoritative: &HashSet<String>, defined: &HashSet<String>) -> SetDifference {
    let mut missing: Vec<String> = authoritative.difference(defined).cloned().collect();
    let mut extra: Vec<String> = defined.difference(authoritative).cloned().collect();
    missing.sort();
    extra.sort();
    SetDifference { missing, extra }
}
