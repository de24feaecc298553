//! Delta sheet layout

use crate::table::Table;
use tc_qa_recon::DeltaEntry;

/// Delta sheet header
pub const DELTA_HEADER: [&str; 10] = [
    "Test Case Name",
    "Old Pass",
    "New Pass",
    "Old Fail",
    "New Fail",
    "Old Not Tested",
    "New Not Tested",
    "Old Total",
    "New Total",
    "Status",
];

/// Single-cell sheet written when nothing changed
pub const NO_CHANGES_MESSAGE: &str =
    "No changes found among Not Executed and Low Pass test cases.";

/// Lay out delta entries, or the no-changes message when there are none
#[must_use]
pub fn delta_table(entries: &[DeltaEntry]) -> Table {
    if entries.is_empty() {
        return Table::with_header([NO_CHANGES_MESSAGE]);
    }
    let mut table = Table::with_header(DELTA_HEADER);
    for entry in entries {
        let (old, new) = (entry.old, entry.new);
        table.push_row([
            entry.test_case.clone(),
            old.pass.to_string(),
            new.pass.to_string(),
            old.fail.to_string(),
            new.fail.to_string(),
            old.not_tested.to_string(),
            new.not_tested.to_string(),
            old.total.to_string(),
            new.total.to_string(),
            entry.status.to_string(),
        ]);
    }
    table
}
