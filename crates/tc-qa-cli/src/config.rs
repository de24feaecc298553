//! `tc-qa.yaml` configuration
//!
//! Every field has a default, so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use tc_qa_issues::{DigestConfig, short_name};
use tc_qa_recon::{
    AggregatorConfig, DedupGranularity, MasterListColumns, ResultColumns, SheetColumns,
};
use tc_qa_report::{SummaryJob, SummaryWorksheets};

/// Default config file name
pub const DEFAULT_CONFIG_FILE: &str = "tc-qa.yaml";

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Workbook directory (one CSV file per worksheet)
    #[serde(default = "default_workbook")]
    pub workbook: PathBuf,
    /// Mapping-file review
    #[serde(default)]
    pub review: ReviewConfig,
    /// Results summary
    #[serde(default)]
    pub summary: SummaryConfig,
    /// Issue digests
    #[serde(default)]
    pub issues: IssuesConfig,
}

fn default_workbook() -> PathBuf {
    PathBuf::from("workbook")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workbook: default_workbook(),
            review: ReviewConfig::default(),
            summary: SummaryConfig::default(),
            issues: IssuesConfig::default(),
        }
    }
}

impl Config {
    /// Parse YAML text
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load from a file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Load `path` if it exists, defaults otherwise
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::info!(path = %path.display(), "config file not found, using defaults");
            Ok(Self::default())
        }
    }
}

/// Review settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewConfig {
    /// Worksheet holding the authoritative test-case list
    #[serde(default = "default_review_worksheet")]
    pub worksheet: String,
    /// Id and status columns
    #[serde(default)]
    pub columns: SheetColumns,
    /// Mapping file to review
    #[serde(default = "default_mapping_file")]
    pub mapping_file: PathBuf,
    /// Review log directory
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
}

fn default_review_worksheet() -> String {
    "TC_Mapping".to_string()
}

fn default_mapping_file() -> PathBuf {
    PathBuf::from("mapping.json")
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            worksheet: default_review_worksheet(),
            columns: SheetColumns::default(),
            mapping_file: default_mapping_file(),
            log_dir: default_log_dir(),
        }
    }
}

/// Summary settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryConfig {
    /// Worksheet names
    #[serde(default)]
    pub worksheets: SummaryWorksheets,
    /// Master list columns
    #[serde(default)]
    pub master_columns: MasterListColumns,
    /// Result worksheet columns
    #[serde(default)]
    pub result_columns: ResultColumns,
    /// Credit granularity
    #[serde(default)]
    pub granularity: DedupGranularity,
}

impl SummaryConfig {
    /// Job built from these settings
    #[must_use]
    pub fn job(&self) -> SummaryJob {
        SummaryJob {
            worksheets: self.worksheets.clone(),
            master_columns: self.master_columns,
            result_columns: self.result_columns,
            aggregator: AggregatorConfig {
                granularity: self.granularity,
            },
        }
    }
}

/// One tracked repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// Full name, `owner/repo`
    pub name: String,
    /// Per-repository worksheet (repository short name when unset)
    #[serde(default)]
    pub worksheet: Option<String>,
    /// Issue export file name inside the export directory
    #[serde(default)]
    pub issues_file: Option<PathBuf>,
    /// Pull request export file name inside the export directory
    #[serde(default)]
    pub pulls_file: Option<PathBuf>,
}

impl RepositoryConfig {
    /// Repository entry with default file and worksheet names
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            worksheet: None,
            issues_file: None,
            pulls_file: None,
        }
    }

    /// Worksheet for this repository's issue list
    #[must_use]
    pub fn worksheet(&self) -> String {
        self.worksheet
            .clone()
            .unwrap_or_else(|| short_name(&self.name).to_string())
    }

    /// `<short name>_issues.json` unless overridden
    #[must_use]
    pub fn issues_file(&self) -> PathBuf {
        self.issues_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}_issues.json", short_name(&self.name))))
    }

    /// `<short name>_pulls.json` unless overridden
    #[must_use]
    pub fn pulls_file(&self) -> PathBuf {
        self.pulls_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}_pulls.json", short_name(&self.name))))
    }
}

/// Weekly digest worksheet names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyWorksheets {
    /// Created in the last seven days
    #[serde(default = "default_new_worksheet")]
    pub new: String,
    /// Closed in the last seven days
    #[serde(default = "default_closed_worksheet")]
    pub closed: String,
    /// Still open
    #[serde(default = "default_open_worksheet")]
    pub open: String,
}

fn default_new_worksheet() -> String {
    "New_Issues_In_Last_7Days".to_string()
}

fn default_closed_worksheet() -> String {
    "Closed_Issues_In_Last_7Days".to_string()
}

fn default_open_worksheet() -> String {
    "Open_Issues_In_Last_7Days".to_string()
}

impl Default for WeeklyWorksheets {
    fn default() -> Self {
        Self {
            new: default_new_worksheet(),
            closed: default_closed_worksheet(),
            open: default_open_worksheet(),
        }
    }
}

/// Issue digest settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuesConfig {
    /// Tracked repositories
    #[serde(default)]
    pub repositories: Vec<RepositoryConfig>,
    /// Directory holding the JSON exports
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,
    /// Filters and tags
    #[serde(default)]
    pub digest: DigestConfig,
    /// Worksheet with every repository's issues
    #[serde(default = "default_combined_worksheet")]
    pub combined_worksheet: String,
    /// Weekly worksheets
    #[serde(default)]
    pub weekly: WeeklyWorksheets,
    /// Merged pull request worksheet
    #[serde(default = "default_merged_worksheet")]
    pub merged_worksheet: String,
}

fn default_export_dir() -> PathBuf {
    PathBuf::from("exports")
}

fn default_combined_worksheet() -> String {
    "All_repo_Issues".to_string()
}

fn default_merged_worksheet() -> String {
    "Merged_PRs".to_string()
}

impl Default for IssuesConfig {
    fn default() -> Self {
        Self {
            repositories: Vec::new(),
            export_dir: default_export_dir(),
            digest: DigestConfig::default(),
            combined_worksheet: default_combined_worksheet(),
            weekly: WeeklyWorksheets::default(),
            merged_worksheet: default_merged_worksheet(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(Config::from_yaml("").expect("parse"), Config::default());
        assert_eq!(Config::from_yaml("{}").expect("parse"), Config::default());
    }

    #[test]
    fn test_partial_config() {
        let yaml = r"
workbook: book
review:
  worksheet: Mapping
  columns:
    id: 2
summary:
  worksheets:
    results: 1.5_SVE_Results
  granularity: device
issues:
  repositories:
    - name: project/test-scripts
      worksheet: Scripts
    - name: project/tools
  digest:
    include_pull_requests: false
    highlighted_authors: [alice]
";
        let config = Config::from_yaml(yaml).expect("parse");
        assert_eq!(config.workbook, PathBuf::from("book"));
        assert_eq!(config.review.worksheet, "Mapping");
        assert_eq!(config.review.columns.id, 2);
        assert_eq!(config.review.columns.status, 6);
        assert_eq!(config.review.log_dir, PathBuf::from("logs"));

        let job = config.summary.job();
        assert_eq!(job.worksheets.results, "1.5_SVE_Results");
        assert_eq!(job.worksheets.master, "TC_List");
        assert_eq!(job.aggregator.granularity, DedupGranularity::Device);

        let repos = &config.issues.repositories;
        assert_eq!(repos[0].worksheet(), "Scripts");
        assert_eq!(repos[1].worksheet(), "tools");
        assert_eq!(repos[1].issues_file(), PathBuf::from("tools_issues.json"));
        assert_eq!(repos[1].pulls_file(), PathBuf::from("tools_pulls.json"));
        assert!(!config.issues.digest.include_pull_requests);
        assert_eq!(config.issues.digest.highlight_tag, "QA");
        assert_eq!(config.issues.weekly.open, "Open_Issues_In_Last_7Days");
    }

    #[test]
    fn test_sample_config_matches_defaults() {
        let config = Config::from_yaml(include_str!("../../../tc-qa.yaml")).expect("parse");
        assert_eq!(config.review, ReviewConfig::default());
        assert_eq!(config.summary, SummaryConfig::default());
        assert_eq!(config.issues.repositories.len(), 2);
        assert_eq!(config.issues.digest, DigestConfig::default());
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(Config::from_yaml("review: [").is_err());
        assert!(Config::from_yaml("summary:\n  granularity: planet\n").is_err());
    }

    #[test]
    fn test_load_or_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        assert_eq!(Config::load_or_default(&path).expect("defaults"), Config::default());

        std::fs::write(&path, "workbook: other\n").expect("write");
        let config = Config::load_or_default(&path).expect("load");
        assert_eq!(config.workbook, PathBuf::from("other"));
    }
}
