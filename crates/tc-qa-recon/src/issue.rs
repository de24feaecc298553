//! Reconciliation issues
//!
//! Every defect found while reviewing a mapping file is one
//! [`ReconciliationIssue`]. Issues are report content, never errors.

use serde::{Deserialize, Serialize};

use crate::definition::CertStatus;
use crate::pics::PicsRule;

/// Placeholder for issues seen before the first record opened
const UNKNOWN_RECORD: &str = "<unknown>";

/// Issue variant without payload, used for grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IssueKind {
    /// Present in the sheet, absent from the mapping file
    MissingInDefinitions,
    /// Present in the mapping file, absent from the sheet
    ExtraInDefinitions,
    /// `CertificationStatus` is empty
    EmptyCertStatus,
    /// Flag does not follow from the status
    CertFlagMismatch,
    /// Sheet status disagrees with the mapping file status
    SheetStatusMismatch,
    /// Flag does not follow from the sheet status
    SheetFlagMismatch,
    /// PICS sub-token failed validation
    InvalidPicsToken,
}

impl std::fmt::Display for IssueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::MissingInDefinitions => "Missing in mapping file",
            Self::ExtraInDefinitions => "Extra in mapping file",
            Self::EmptyCertStatus => "Empty CertificationStatus",
            Self::CertFlagMismatch => "CertificationStatus vs cert mismatch",
            Self::SheetStatusMismatch => "Sheet vs mapping status mismatch",
            Self::SheetFlagMismatch => "Sheet status vs cert mismatch",
            Self::InvalidPicsToken => "Invalid PICS token",
        };
        f.write_str(label)
    }
}

/// A single defect with enough context to render one diagnostic line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReconciliationIssue {
    /// Test case listed in the sheet but not defined
    MissingInDefinitions {
        /// Test case id
        id: String,
    },
    /// Test case defined but not listed in the sheet
    ExtraInDefinitions {
        /// Test case id
        id: String,
        /// Source lines (1-based number, trimmed text) mentioning the id
        occurrences: Vec<(usize, String)>,
    },
    /// Empty certification status
    EmptyCertStatus {
        /// Line of the status field
        line: usize,
        /// Owning record
        record_id: Option<String>,
    },
    /// Flag line missing or inconsistent with the status
    CertFlagMismatch {
        /// Line expected to hold the flag
        line: usize,
        /// Owning record
        record_id: Option<String>,
        /// Status found in the mapping file
        status: CertStatus,
        /// Expected flag line
        expected: String,
        /// What was found instead (empty at end of file)
        found: String,
    },
    /// Sheet and mapping file disagree on the status
    SheetStatusMismatch {
        /// Line of the status field
        line: usize,
        /// Owning record
        record_id: Option<String>,
        /// Status in the sheet
        sheet_status: CertStatus,
        /// Raw status in the mapping file
        definition_status: String,
    },
    /// Flag line inconsistent with the sheet status
    SheetFlagMismatch {
        /// Line expected to hold the flag
        line: usize,
        /// Owning record
        record_id: Option<String>,
        /// Status in the sheet
        sheet_status: CertStatus,
        /// Flag line implied by the sheet status
        expected: String,
        /// What was found instead
        found: String,
    },
    /// PICS sub-token failed validation
    InvalidPicsToken {
        /// Line holding the token
        line: usize,
        /// Owning record
        record_id: Option<String>,
        /// Offending sub-token
        token: String,
        /// First rule it violates
        rule: PicsRule,
    },
}

impl ReconciliationIssue {
    /// Variant tag
    #[must_use]
    pub fn kind(&self) -> IssueKind {
        match self {
            Self::MissingInDefinitions { .. } => IssueKind::MissingInDefinitions,
            Self::ExtraInDefinitions { .. } => IssueKind::ExtraInDefinitions,
            Self::EmptyCertStatus { .. } => IssueKind::EmptyCertStatus,
            Self::CertFlagMismatch { .. } => IssueKind::CertFlagMismatch,
            Self::SheetStatusMismatch { .. } => IssueKind::SheetStatusMismatch,
            Self::SheetFlagMismatch { .. } => IssueKind::SheetFlagMismatch,
            Self::InvalidPicsToken { .. } => IssueKind::InvalidPicsToken,
        }
    }

    /// Owning record, when the issue comes from the structural scan
    #[must_use]
    pub fn record_id(&self) -> Option<&str> {
        match self {
            Self::MissingInDefinitions { id } | Self::ExtraInDefinitions { id, .. } => {
                Some(id.as_str())
            }
            Self::EmptyCertStatus { record_id, .. }
            | Self::CertFlagMismatch { record_id, .. }
            | Self::SheetStatusMismatch { record_id, .. }
            | Self::SheetFlagMismatch { record_id, .. }
            | Self::InvalidPicsToken { record_id, .. } => record_id.as_deref(),
        }
    }

    /// Human-readable diagnostic lines
    ///
    /// Extra ids render one line per source occurrence; every other variant
    /// renders exactly one line.
    #[must_use]
    pub fn diagnostic_lines(&self) -> Vec<String> {
        let owner = self.record_id().unwrap_or(UNKNOWN_RECORD);
        match self {
            Self::MissingInDefinitions { id } => vec![id.clone()],
            Self::ExtraInDefinitions { id, occurrences } => {
                if occurrences.is_empty() {
                    vec![id.clone()]
                } else {
                    occurrences
                        .iter()
                        .map(|(line, text)| format!("Line {line}: {text}"))
                        .collect()
                }
            }
            Self::EmptyCertStatus { line, .. } => vec![format!(
                "Line {line}: CertificationStatus is empty in test case {owner}"
            )],
            Self::CertFlagMismatch {
                line,
                status,
                expected,
                found,
                ..
            } => vec![format!(
                "Line {line}: In test case {owner}, CertificationStatus='{status}' \
                 and expected cert value is {expected}, but found: {found}"
            )],
            Self::SheetStatusMismatch {
                line,
                sheet_status,
                definition_status,
                ..
            } => vec![format!(
                "Line {line}: In test case {owner}, Sheet says '{sheet_status}', \
                 but JSON has '{definition_status}'"
            )],
            Self::SheetFlagMismatch {
                line,
                sheet_status,
                expected,
                found,
                ..
            } => vec![format!(
                "Line {line}: In test case {owner}, expected {sheet_status} → {expected}, \
                 but found: {found}"
            )],
            Self::InvalidPicsToken { line, token, .. } => vec![format!(
                "Line {line}: Invalid PICS entry '{token}' in test case {owner}"
            )],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_display() {
        assert_eq!(IssueKind::InvalidPicsToken.to_string(), "Invalid PICS token");
        assert_eq!(
            IssueKind::MissingInDefinitions.to_string(),
            "Missing in mapping file"
        );
    }

    #[test]
    fn test_kind_and_record_id() {
        let issue = ReconciliationIssue::EmptyCertStatus {
            line: 4,
            record_id: Some("TC-OO-2.1".to_string()),
        };
        assert_eq!(issue.kind(), IssueKind::EmptyCertStatus);
        assert_eq!(issue.record_id(), Some("TC-OO-2.1"));

        let missing = ReconciliationIssue::MissingInDefinitions {
            id: "TC-ACL-1.1".to_string(),
        };
        assert_eq!(missing.kind(), IssueKind::MissingInDefinitions);
        assert_eq!(missing.record_id(), Some("TC-ACL-1.1"));
    }

    #[test]
    fn test_cert_flag_mismatch_line() {
        let issue = ReconciliationIssue::CertFlagMismatch {
            line: 5,
            record_id: Some("TC1".to_string()),
            status: CertStatus::Executable,
            expected: "\"cert\": \"true\"".to_string(),
            found: "\"cert\": \"false\"".to_string(),
        };
        assert_eq!(
            issue.diagnostic_lines(),
            vec![
                "Line 5: In test case TC1, CertificationStatus='Executable' and expected cert \
                 value is \"cert\": \"true\", but found: \"cert\": \"false\""
                    .to_string()
            ]
        );
    }

    #[test]
    fn test_unknown_owner() {
        let issue = ReconciliationIssue::InvalidPicsToken {
            line: 2,
            record_id: None,
            token: "CMD&X".to_string(),
            rule: PicsRule::ForbiddenCharacter,
        };
        assert_eq!(
            issue.diagnostic_lines(),
            vec!["Line 2: Invalid PICS entry 'CMD&X' in test case <unknown>".to_string()]
        );
    }

    #[test]
    fn test_extra_lines_per_occurrence() {
        let issue = ReconciliationIssue::ExtraInDefinitions {
            id: "TC-X".to_string(),
            occurrences: vec![(3, "\"TC-X\": {".to_string()), (40, "\"TC-X\",".to_string())],
        };
        let lines = issue.diagnostic_lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "Line 3: \"TC-X\": {");
    }

    #[test]
    fn test_sheet_mismatch_lines() {
        let status = ReconciliationIssue::SheetStatusMismatch {
            line: 7,
            record_id: Some("TC2".to_string()),
            sheet_status: CertStatus::Blocked,
            definition_status: "Executable".to_string(),
        };
        assert!(status.diagnostic_lines()[0].contains("Sheet says 'Blocked', but JSON has 'Executable'"));

        let flag = ReconciliationIssue::SheetFlagMismatch {
            line: 8,
            record_id: Some("TC2".to_string()),
            sheet_status: CertStatus::Blocked,
            expected: "\"cert\": \"false\"".to_string(),
            found: "\"cert\": \"true\"".to_string(),
        };
        assert!(flag.diagnostic_lines()[0].contains("expected Blocked → \"cert\": \"false\""));
    }

    #[test]
    fn test_issue_serializes_with_kind_tag() {
        let issue = ReconciliationIssue::MissingInDefinitions {
            id: "TC9".to_string(),
        };
        let json = serde_json::to_string(&issue).expect("serialize");
        assert!(json.contains("\"kind\":\"missing_in_definitions\""));
    }
}
