//! Style intents
//!
//! Formatting is described, not performed. Each [`StyleIntent`] names a cell
//! range and the background, weight and alignment to give it; a
//! [`ReportSink`](crate::ReportSink) decides how to apply them. Intents are
//! applied in order, so later ones win where ranges overlap.

use serde::{Deserialize, Serialize};

use crate::table::Table;
use tc_qa_recon::{DeltaStatus, ReportSection};

/// RGB color with components in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red
    pub red: f32,
    /// Green
    pub green: f32,
    /// Blue
    pub blue: f32,
}

impl Color {
    /// Plain background
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    /// Section header rows and reduced delta rows
    pub const YELLOW: Self = Self::rgb(1.0, 1.0, 0.6);
    /// Updated delta rows
    pub const GREEN: Self = Self::rgb(0.8, 1.0, 0.8);
    /// Changed delta rows
    pub const GREY: Self = Self::rgb(0.9, 0.9, 0.9);

    /// Build from components
    #[must_use]
    pub const fn rgb(red: f32, green: f32, blue: f32) -> Self {
        Self { red, green, blue }
    }
}

/// Horizontal alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Alignment {
    /// Left
    Left,
    /// Center
    Center,
    /// Right
    Right,
}

/// Rectangular 1-based cell range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRange {
    /// First row
    pub first_row: usize,
    /// Last row (inclusive)
    pub last_row: usize,
    /// First column
    pub first_column: usize,
    /// Last column (inclusive)
    pub last_column: usize,
}

impl CellRange {
    /// Range spanning `first_column..=last_column` on a single row
    #[must_use]
    pub fn row(row: usize, first_column: usize, last_column: usize) -> Self {
        Self {
            first_row: row,
            last_row: row,
            first_column,
            last_column,
        }
    }

    /// A1 notation, e.g. `A2:J10`
    #[must_use]
    pub fn a1(&self) -> String {
        format!(
            "{}{}:{}{}",
            col_to_letter(self.first_column),
            self.first_row,
            col_to_letter(self.last_column),
            self.last_row
        )
    }
}

impl std::fmt::Display for CellRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.a1())
    }
}

/// Formatting to apply to a range; `None` fields are left untouched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleIntent {
    /// Target range
    pub range: CellRange,
    /// Background color
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<Color>,
    /// Bold text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    /// Horizontal alignment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<Alignment>,
}

impl StyleIntent {
    /// Intent that changes nothing yet
    #[must_use]
    pub fn new(range: CellRange) -> Self {
        Self {
            range,
            background: None,
            bold: None,
            alignment: None,
        }
    }

    /// Set the background
    #[must_use]
    pub fn background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    /// Set the weight
    #[must_use]
    pub fn bold(mut self, bold: bool) -> Self {
        self.bold = Some(bold);
        self
    }

    /// Set the alignment
    #[must_use]
    pub fn align(mut self, alignment: Alignment) -> Self {
        self.alignment = Some(alignment);
        self
    }
}

/// 1-based column number to its letter name (`1 → A`, `27 → AA`)
#[must_use]
pub fn col_to_letter(column: usize) -> String {
    let mut letters = Vec::new();
    let mut n = column;
    while n > 0 {
        n -= 1;
        // n % 26 < 26, always a valid offset from 'A'
        letters.push(char::from(b'A' + (n % 26) as u8));
        n /= 26;
    }
    letters.iter().rev().collect()
}

/// Clear previous formatting below the header of a `rows` × `columns` sheet
///
/// White, not bold, column A left aligned, the rest right aligned. Sheets
/// with only a header need no reset.
#[must_use]
pub fn reset_intents(rows: usize, columns: usize) -> Vec<StyleIntent> {
    if rows <= 1 || columns == 0 {
        return Vec::new();
    }
    let body = |first_column, last_column| CellRange {
        first_row: 2,
        last_row: rows,
        first_column,
        last_column,
    };
    let mut intents = vec![
        StyleIntent::new(body(1, columns))
            .background(Color::WHITE)
            .bold(false),
        StyleIntent::new(body(1, 1)).align(Alignment::Left),
    ];
    if columns > 1 {
        intents.push(StyleIntent::new(body(2, columns)).align(Alignment::Right));
    }
    intents
}

/// Highlight summary section header rows across the header width
#[must_use]
pub fn section_intents(table: &Table) -> Vec<StyleIntent> {
    let width = table.width().max(1);
    table
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| {
            row.first().is_some_and(|cell| {
                ReportSection::ALL
                    .iter()
                    .any(|section| section.title() == cell.trim())
            })
        })
        .map(|(idx, _)| {
            StyleIntent::new(CellRange::row(idx + 1, 1, width))
                .background(Color::YELLOW)
                .bold(true)
                .align(Alignment::Center)
        })
        .collect()
}

/// Background for a delta row
#[must_use]
pub fn delta_color(status: DeltaStatus) -> Color {
    match status {
        DeltaStatus::Updated => Color::GREEN,
        DeltaStatus::Reduced => Color::YELLOW,
        DeltaStatus::Changed => Color::GREY,
    }
}

/// Color every delta row by the status in its last column
///
/// Rows shorter than the header or with an unrecognized status are skipped.
#[must_use]
pub fn delta_intents(table: &Table) -> Vec<StyleIntent> {
    let width = table.width();
    if width == 0 {
        return Vec::new();
    }
    table
        .rows()
        .iter()
        .enumerate()
        .skip(1)
        .filter(|(_, row)| row.len() >= width)
        .filter_map(|(idx, row)| {
            let status = match row[width - 1].trim() {
                "Updated" => DeltaStatus::Updated,
                "Reduced" => DeltaStatus::Reduced,
                "Changed" => DeltaStatus::Changed,
                _ => return None,
            };
            Some(
                StyleIntent::new(CellRange::row(idx + 1, 1, width))
                    .background(delta_color(status)),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_col_to_letter() {
        assert_eq!(col_to_letter(1), "A");
        assert_eq!(col_to_letter(10), "J");
        assert_eq!(col_to_letter(26), "Z");
        assert_eq!(col_to_letter(27), "AA");
        assert_eq!(col_to_letter(52), "AZ");
        assert_eq!(col_to_letter(703), "AAA");
        assert_eq!(col_to_letter(0), "");
    }

    #[test]
    fn test_range_a1() {
        assert_eq!(CellRange::row(4, 1, 8).a1(), "A4:H4");
        let range = CellRange {
            first_row: 2,
            last_row: 40,
            first_column: 2,
            last_column: 10,
        };
        assert_eq!(range.to_string(), "B2:J40");
    }

    #[test]
    fn test_reset_intents() {
        let intents = reset_intents(12, 8);
        assert_eq!(intents.len(), 3);
        assert_eq!(intents[0].range.a1(), "A2:H12");
        assert_eq!(intents[0].background, Some(Color::WHITE));
        assert_eq!(intents[0].bold, Some(false));
        assert_eq!(intents[1].alignment, Some(Alignment::Left));
        assert_eq!(intents[2].range.a1(), "B2:H12");
        assert_eq!(intents[2].alignment, Some(Alignment::Right));

        assert_eq!(reset_intents(5, 1).len(), 2);
        assert!(reset_intents(1, 8).is_empty());
    }

    #[test]
    fn test_section_intents() {
        let mut table = Table::with_header(["Name", "Pass", "Fail"]);
        table.push_row([ReportSection::NotExecuted.title()]);
        table.push_row(["TC1", "0", "0"]);
        table.push_row([""]);
        table.push_row([ReportSection::LowPass.title()]);

        let intents = section_intents(&table);
        let ranges: Vec<_> = intents.iter().map(|i| i.range.a1()).collect();
        assert_eq!(ranges, vec!["A2:C2", "A5:C5"]);
        assert_eq!(intents[0].background, Some(Color::YELLOW));
        assert_eq!(intents[0].bold, Some(true));
        assert_eq!(intents[0].alignment, Some(Alignment::Center));
    }

    #[test]
    fn test_delta_intents() {
        let mut table = Table::with_header(["Name", "Status"]);
        table.push_row(["TC1", "Updated"]);
        table.push_row(["TC2", "Reduced"]);
        table.push_row(["TC3", "Changed"]);
        table.push_row(["TC4", "Other"]);
        table.push_row(["short"]);

        let colors: Vec<_> = delta_intents(&table)
            .into_iter()
            .map(|i| (i.range.first_row, i.background))
            .collect();
        assert_eq!(
            colors,
            vec![
                (2, Some(Color::GREEN)),
                (3, Some(Color::YELLOW)),
                (4, Some(Color::GREY)),
            ]
        );
    }

    #[test]
    fn test_intent_serializes_sparse() {
        let intent = StyleIntent::new(CellRange::row(1, 1, 1)).align(Alignment::Left);
        let json = serde_json::to_string(&intent).expect("serialize");
        assert!(json.contains("\"alignment\":\"LEFT\""));
        assert!(!json.contains("background"));
    }
}
