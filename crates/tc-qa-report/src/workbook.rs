//! Worksheet adapters
//!
//! [`SpreadsheetSource`] reads worksheets and [`ReportSink`] writes them. The
//! core never sees either; only the jobs in this crate and the CLI do.
//!
//! Two implementations:
//! - [`CsvWorkbook`]: a directory with one `<worksheet>.csv` per worksheet and
//!   the formatting in `<worksheet>.styles.json`
//! - [`MemoryWorkbook`]: in-memory, for tests and dry runs

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::style::StyleIntent;
use crate::table::Table;

/// Read access to worksheets
pub trait SpreadsheetSource: Send + Sync {
    /// All rows of a worksheet, header included
    ///
    /// # Errors
    ///
    /// Returns [`Error::WorksheetNotFound`] if the worksheet does not exist.
    fn rows(&self, worksheet: &str) -> Result<Vec<Vec<String>>>;
}

/// Write access to worksheets
pub trait ReportSink: Send + Sync {
    /// Clear a worksheet (creating it if needed) and write `table`
    ///
    /// Formatting applied since the previous `replace` is dropped as well.
    ///
    /// # Errors
    ///
    /// Returns an error if the worksheet cannot be written.
    fn replace(&mut self, worksheet: &str, table: &Table) -> Result<()>;

    /// Layer style intents on top of the worksheet's current formatting
    ///
    /// # Errors
    ///
    /// Returns an error if the formatting cannot be stored.
    fn apply_styles(&mut self, worksheet: &str, intents: &[StyleIntent]) -> Result<()>;
}

/// Apply styles, downgrading a failure to a warning
///
/// Returns whether the styles were applied.
pub fn try_apply_styles<S: ReportSink + ?Sized>(
    sink: &mut S,
    worksheet: &str,
    intents: &[StyleIntent],
) -> bool {
    if intents.is_empty() {
        return true;
    }
    match sink.apply_styles(worksheet, intents) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(worksheet, error = %e, "could not apply formatting");
            false
        }
    }
}

fn check_worksheet_name(worksheet: &str) -> Result<()> {
    if worksheet.trim().is_empty() {
        return Err(Error::Validation("empty worksheet name".to_string()));
    }
    if worksheet.contains(['/', '\\']) || worksheet == "." || worksheet == ".." {
        return Err(Error::Validation(format!(
            "worksheet name '{worksheet}' is not a plain file name"
        )));
    }
    Ok(())
}

/// Workbook stored as a directory of CSV files
#[derive(Debug, Clone)]
pub struct CsvWorkbook {
    dir: PathBuf,
}

impl CsvWorkbook {
    /// Open an existing workbook directory
    ///
    /// # Errors
    ///
    /// Returns an error if the directory does not exist.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(Error::Io(format!(
                "Workbook directory not found: {}",
                dir.display()
            )));
        }
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// Open a workbook directory, creating it if needed
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn create(dir: impl AsRef<Path>) -> Result<Self> {
        std::fs::create_dir_all(dir.as_ref())?;
        Self::open(dir)
    }

    /// Workbook directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of a worksheet's CSV file
    #[must_use]
    pub fn sheet_path(&self, worksheet: &str) -> PathBuf {
        self.dir.join(format!("{worksheet}.csv"))
    }

    /// Path of a worksheet's formatting file
    #[must_use]
    pub fn styles_path(&self, worksheet: &str) -> PathBuf {
        self.dir.join(format!("{worksheet}.styles.json"))
    }

    /// Formatting currently stored for a worksheet
    ///
    /// # Errors
    ///
    /// Returns an error if the formatting file exists but cannot be parsed.
    pub fn styles(&self, worksheet: &str) -> Result<Vec<StyleIntent>> {
        check_worksheet_name(worksheet)?;
        let path = self.styles_path(worksheet);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let raw = std::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

impl SpreadsheetSource for CsvWorkbook {
    fn rows(&self, worksheet: &str) -> Result<Vec<Vec<String>>> {
        check_worksheet_name(worksheet)?;
        let path = self.sheet_path(worksheet);
        if !path.is_file() {
            return Err(Error::WorksheetNotFound(worksheet.to_string()));
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&path)
            .map_err(|e| Error::Io(format!("Failed to open {}: {e}", path.display())))?;

        let mut rows = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record = result.map_err(|e| {
                Error::Validation(format!("CSV parse error in {worksheet} at row {idx}: {e}"))
            })?;
            rows.push(record.iter().map(str::to_string).collect());
        }
        Ok(rows)
    }
}

impl ReportSink for CsvWorkbook {
    fn replace(&mut self, worksheet: &str, table: &Table) -> Result<()> {
        check_worksheet_name(worksheet)?;
        let path = self.sheet_path(worksheet);

        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_path(&path)
            .map_err(|e| Error::Io(format!("Failed to create {}: {e}", path.display())))?;
        for row in table.rows() {
            writer
                .write_record(row)
                .map_err(|e| Error::Io(format!("Failed to write CSV row: {e}")))?;
        }
        writer
            .flush()
            .map_err(|e| Error::Io(format!("Failed to flush CSV writer: {e}")))?;

        let styles = self.styles_path(worksheet);
        if styles.exists() {
            std::fs::remove_file(&styles)?;
        }
        tracing::debug!(worksheet, rows = table.len(), path = %path.display(), "replaced worksheet");
        Ok(())
    }

    fn apply_styles(&mut self, worksheet: &str, intents: &[StyleIntent]) -> Result<()> {
        let mut current = self.styles(worksheet)?;
        current.extend_from_slice(intents);
        let json = serde_json::to_string_pretty(&current)?;
        std::fs::write(self.styles_path(worksheet), json)?;
        Ok(())
    }
}

/// In-memory workbook
#[derive(Debug, Clone, Default)]
pub struct MemoryWorkbook {
    sheets: BTreeMap<String, Vec<Vec<String>>>,
    styles: BTreeMap<String, Vec<StyleIntent>>,
    fail_styles: bool,
}

impl MemoryWorkbook {
    /// Empty workbook
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a worksheet
    #[must_use]
    pub fn with_sheet<R, C>(mut self, worksheet: impl Into<String>, rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let rows: Vec<Vec<String>> = rows
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect::<Vec<String>>())
            .collect();
        self.sheets.insert(worksheet.into(), rows);
        self
    }

    /// Make every `apply_styles` call fail
    #[must_use]
    pub fn with_style_failure(mut self) -> Self {
        self.fail_styles = true;
        self
    }

    /// Rows of a worksheet, if it exists
    #[must_use]
    pub fn sheet(&self, worksheet: &str) -> Option<&[Vec<String>]> {
        self.sheets.get(worksheet).map(Vec::as_slice)
    }

    /// Formatting applied to a worksheet since its last replace
    #[must_use]
    pub fn styles(&self, worksheet: &str) -> &[StyleIntent] {
        self.styles
            .get(worksheet)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

impl SpreadsheetSource for MemoryWorkbook {
    fn rows(&self, worksheet: &str) -> Result<Vec<Vec<String>>> {
        self.sheets
            .get(worksheet)
            .cloned()
            .ok_or_else(|| Error::WorksheetNotFound(worksheet.to_string()))
    }
}

impl ReportSink for MemoryWorkbook {
    fn replace(&mut self, worksheet: &str, table: &Table) -> Result<()> {
        check_worksheet_name(worksheet)?;
        self.sheets
            .insert(worksheet.to_string(), table.rows().to_vec());
        self.styles.remove(worksheet);
        Ok(())
    }

    fn apply_styles(&mut self, worksheet: &str, intents: &[StyleIntent]) -> Result<()> {
        if self.fail_styles {
            return Err(Error::Io(format!(
                "formatting rejected for worksheet {worksheet}"
            )));
        }
        self.styles
            .entry(worksheet.to_string())
            .or_default()
            .extend_from_slice(intents);
        Ok(())
    }
}
