//! Test-case mapping file
//!
//! The mapping file is a JSON object keyed by test case id:
//!
//! ```json
//! {
//!   "TC-OO-2.1": {
//!     "CertificationStatus": "Executable",
//!     "cert": "true",
//!     "PICS": [
//!       "OO.S",
//!       "OO.S.A0000 | OO.S.A4001"
//!     ]
//!   }
//! }
//! ```
//!
//! Two views are exposed: the raw lines (the structural scan needs line
//! numbers and adjacency) and the parsed records.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use crate::error::{Error, Result};

/// Field holding the certification status of a record
pub const STATUS_FIELD: &str = "CertificationStatus";
/// Boolean flag field that must follow the status
pub const FLAG_FIELD: &str = "cert";
/// Token list field
pub const PICS_FIELD: &str = "PICS";

/// Certification status as written in the mapping file and the sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CertStatus {
    /// Ready for certification testing
    Executable,
    /// Cannot be executed
    Blocked,
    /// Executable but not yet counted for certification
    Provisional,
}

impl CertStatus {
    /// Parse an exact status string; anything else is `None`
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Executable" => Some(Self::Executable),
            "Blocked" => Some(Self::Blocked),
            "Provisional" => Some(Self::Provisional),
            _ => None,
        }
    }

    /// Canonical string form
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Executable => "Executable",
            Self::Blocked => "Blocked",
            Self::Provisional => "Provisional",
        }
    }

    /// Flag value implied by this status
    #[must_use]
    pub const fn expected_flag(&self) -> &'static str {
        match self {
            Self::Executable => "true",
            Self::Blocked | Self::Provisional => "false",
        }
    }

    /// Flag line expected right after the status line, e.g. `"cert": "true"`
    #[must_use]
    pub fn expected_flag_line(&self) -> String {
        format!("\"{FLAG_FIELD}\": \"{}\"", self.expected_flag())
    }
}

impl std::fmt::Display for CertStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One entry of the mapping file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCaseRecord {
    /// Test case id (map key)
    pub id: String,
    /// Raw certification status; empty when missing
    pub certification_status: String,
    /// Raw flag value; `None` when the field is missing
    pub cert_flag: Option<String>,
    /// Raw token-block strings, in source order
    pub pics_tokens: Vec<String>,
}

impl TestCaseRecord {
    /// Parsed status, `None` for empty or unknown values
    #[must_use]
    pub fn status(&self) -> Option<CertStatus> {
        CertStatus::parse(&self.certification_status)
    }

    /// Whether the flag agrees with the status
    ///
    /// Records without a known status are never consistent.
    #[must_use]
    pub fn flag_consistent(&self) -> bool {
        match (self.status(), self.cert_flag.as_deref()) {
            (Some(status), Some(flag)) => flag == status.expected_flag(),
            _ => false,
        }
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Raw mapping file contents
#[derive(Debug, Clone)]
pub struct DefinitionSource {
    raw: String,
}

impl DefinitionSource {
    /// Wrap already-loaded file contents
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// Load a mapping file from disk
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(Self { raw })
    }

    /// Raw text
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Source lines without line terminators
    #[must_use]
    pub fn lines(&self) -> Vec<&str> {
        self.raw.lines().collect()
    }

    fn parse_object(&self) -> Result<serde_json::Map<String, Value>> {
        match serde_json::from_str::<Value>(&self.raw)? {
            Value::Object(map) => Ok(map),
            other => Err(Error::DefinitionParse(format!(
                "expected a JSON object keyed by test case id, found {}",
                json_kind(&other)
            ))),
        }
    }

    /// Top-level keys of the mapping file
    ///
    /// # Errors
    ///
    /// Returns an error if the file is not a JSON object.
    pub fn test_case_ids(&self) -> Result<HashSet<String>> {
        Ok(self.parse_object()?.into_iter().map(|(k, _)| k).collect())
    }

    /// Parsed records in source order
    ///
    /// Entries whose value is not an object yield a record with empty fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is not a JSON object.
    pub fn records(&self) -> Result<Vec<TestCaseRecord>> {
        let records = self
            .parse_object()?
            .into_iter()
            .map(|(id, value)| {
                let field = |name: &str| value.get(name);
                TestCaseRecord {
                    certification_status: field(STATUS_FIELD)
                        .map(scalar_to_string)
                        .unwrap_or_default(),
                    cert_flag: field(FLAG_FIELD).map(scalar_to_string),
                    pics_tokens: field(PICS_FIELD)
                        .and_then(Value::as_array)
                        .map(|items| items.iter().map(scalar_to_string).collect())
                        .unwrap_or_default(),
                    id,
                }
            })
            .collect();
        Ok(records)
    }

    /// Lines (1-based number, trimmed text) on which `"<key>"` appears
    #[must_use]
    pub fn occurrences(&self, key: &str) -> Vec<(usize, String)> {
        let needle = format!("\"{key}\"");
        self.raw
            .lines()
            .enumerate()
            .filter(|(_, line)| line.contains(&needle))
            .map(|(idx, line)| (idx + 1, line.trim().to_string()))
            .collect()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Count of records per status; unknown or empty statuses are keyed `None`
#[must_use]
pub fn status_breakdown(records: &[TestCaseRecord]) -> BTreeMap<Option<CertStatus>, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(record.status()).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
  "TC-OO-2.1": {
    "CertificationStatus": "Executable",
    "cert": "true",
    "PICS": [
      "OO.S",
      "OO.S.A0000 | OO.S.A4001"
    ]
  },
  "TC-ACL-1.1": {
    "CertificationStatus": "Blocked",
    "cert": "true",
    "PICS": []
  },
  "TC-LVL-3.1": {
    "CertificationStatus": "",
    "PICS": ["LVL.S"]
  }
}"#;

    #[test]
    fn test_cert_status_parse() {
        assert_eq!(CertStatus::parse("Executable"), Some(CertStatus::Executable));
        assert_eq!(CertStatus::parse("Blocked"), Some(CertStatus::Blocked));
        assert_eq!(CertStatus::parse("Provisional"), Some(CertStatus::Provisional));
        assert_eq!(CertStatus::parse("executable"), None);
        assert_eq!(CertStatus::parse(""), None);
    }

    #[test]
    fn test_expected_flag_line() {
        assert_eq!(CertStatus::Executable.expected_flag_line(), "\"cert\": \"true\"");
        assert_eq!(CertStatus::Blocked.expected_flag_line(), "\"cert\": \"false\"");
        assert_eq!(CertStatus::Provisional.expected_flag(), "false");
    }

    #[test]
    fn test_test_case_ids() {
        let source = DefinitionSource::new(SAMPLE);
        let ids = source.test_case_ids().expect("valid mapping");
        assert_eq!(ids.len(), 3);
        assert!(ids.contains("TC-ACL-1.1"));
    }

    #[test]
    fn test_records_preserve_order() {
        let source = DefinitionSource::new(SAMPLE);
        let records = source.records().expect("valid mapping");
        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["TC-OO-2.1", "TC-ACL-1.1", "TC-LVL-3.1"]);

        assert!(records[0].flag_consistent());
        assert_eq!(records[0].pics_tokens.len(), 2);
        assert!(!records[1].flag_consistent());
        assert_eq!(records[2].status(), None);
        assert_eq!(records[2].cert_flag, None);
    }

    #[test]
    fn test_non_object_rejected() {
        let source = DefinitionSource::new("[1, 2]");
        let err = source.test_case_ids().expect_err("array is not a mapping");
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn test_invalid_json_rejected() {
        let source = DefinitionSource::new("{ not json");
        assert!(source.records().is_err());
    }

    #[test]
    fn test_occurrences() {
        let source = DefinitionSource::new(SAMPLE);
        let hits = source.occurrences("TC-ACL-1.1");
        assert_eq!(hits, vec![(10, "\"TC-ACL-1.1\": {".to_string())]);
        assert!(source.occurrences("TC-NOPE").is_empty());
    }

    #[test]
    fn test_status_breakdown() {
        let records = DefinitionSource::new(SAMPLE).records().expect("valid");
        let counts = status_breakdown(&records);
        assert_eq!(counts.get(&Some(CertStatus::Executable)), Some(&1));
        assert_eq!(counts.get(&Some(CertStatus::Blocked)), Some(&1));
        assert_eq!(counts.get(&None), Some(&1));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("mapping.json");
        std::fs::write(&path, SAMPLE).expect("write");
        let source = DefinitionSource::from_file(&path).expect("load");
        assert_eq!(source.lines().len(), SAMPLE.lines().count());
    }
}
