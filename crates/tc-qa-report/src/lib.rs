//! Test-Case QA Reports
//!
//! Presentation side of the reconciliation core: the plain-text review log,
//! summary and delta sheet tables, style intents, and the worksheet adapters
//! they are read from and written to.
//!
//! The core never touches a workbook. It hands over report content, this
//! crate lays it out as rows and [`StyleIntent`]s, and a [`ReportSink`]
//! applies them.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
// Allow common patterns
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::format_push_string)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::cast_possible_truncation)]
// Allow common patterns in test code
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::float_cmp))]

pub mod delta_table;
pub mod error;
pub mod jobs;
pub mod review_log;
pub mod style;
pub mod summary_table;
pub mod table;
pub mod workbook;

pub use delta_table::{DELTA_HEADER, NO_CHANGES_MESSAGE, delta_table};
pub use error::{Error, Result};
pub use jobs::{ReviewJob, ReviewOutcome, SummaryJob, SummaryOutcome, SummaryWorksheets};
pub use review_log::{log_file_name, render_review_log, write_review_log};
pub use style::{
    Alignment, CellRange, Color, StyleIntent, col_to_letter, delta_color, delta_intents,
    reset_intents, section_intents,
};
pub use summary_table::{SUMMARY_HEADER, parse_previous_summary, summary_table};
pub use table::Table;
pub use workbook::{CsvWorkbook, MemoryWorkbook, ReportSink, SpreadsheetSource, try_apply_styles};
