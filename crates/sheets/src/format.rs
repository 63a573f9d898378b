//! A1 notation and number formats.

use serde::Serialize;

use lotsync_core::constants::{CURRENCY_PATTERN, PERCENT_PATTERN};
use lotsync_core::Table;

/// Column letter for a zero-based index: 0 -> `A`, 25 -> `Z`, 26 -> `AA`.
pub fn column_letter(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Quoted worksheet reference, e.g. `'Open Tax Lots'`.
pub fn quoted_title(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

/// Whole-column data range `C2:C{rows + 1}` below the header row.
pub fn column_data_range(column: usize, rows: usize) -> String {
    let letter = column_letter(column);
    format!("{}2:{}{}", letter, letter, rows + 1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NumberFormatType {
    Currency,
    Percent,
}

/// A Sheets `numberFormat` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NumberFormat {
    #[serde(rename = "type")]
    pub format_type: NumberFormatType,
    pub pattern: &'static str,
}

impl NumberFormat {
    pub const CURRENCY: NumberFormat = NumberFormat {
        format_type: NumberFormatType::Currency,
        pattern: CURRENCY_PATTERN,
    };

    pub const PERCENT: NumberFormat = NumberFormat {
        format_type: NumberFormatType::Percent,
        pattern: PERCENT_PATTERN,
    };
}

/// Number format applied to the data rows of one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnFormat {
    /// Zero-based column index.
    pub column: usize,
    /// First data row, zero-based (1 skips the header).
    pub start_row: usize,
    /// Exclusive end row, zero-based.
    pub end_row: usize,
    pub format: NumberFormat,
}

impl ColumnFormat {
    /// A1 form of the range, e.g. `C2:C11`.
    pub fn a1_range(&self) -> String {
        column_data_range(self.column, self.end_row - self.start_row)
    }
}

/// Formats for the named columns of `table`, covering rows `2..=len+1`.
/// Columns missing from the table are skipped.
pub fn column_formats(table: &Table, columns: &[&str], format: NumberFormat) -> Vec<ColumnFormat> {
    columns
        .iter()
        .filter_map(|name| table.column_index(name))
        .map(|column| ColumnFormat {
            column,
            start_row: 1,
            end_row: table.len() + 1,
            format,
        })
        .collect()
}
