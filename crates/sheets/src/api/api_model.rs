use serde::{Deserialize, Serialize};

/// Minimum grid size of a new worksheet.
pub const DEFAULT_ROW_COUNT: usize = 100;
pub const DEFAULT_COLUMN_COUNT: usize = 20;

/// A spreadsheet visible to the service account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpreadsheetRef {
    pub id: String,
    pub name: String,
}

/// One worksheet (tab) of a spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorksheetInfo {
    pub sheet_id: i64,
    pub title: String,
    pub row_count: usize,
    pub column_count: usize,
}

/// Rows x columns of a worksheet grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSize {
    pub rows: usize,
    pub columns: usize,
}

impl GridSize {
    /// Grid large enough for `rows` x `columns` cells, never smaller than
    /// the default worksheet size.
    pub fn fitting(rows: usize, columns: usize) -> Self {
        Self {
            rows: rows.max(DEFAULT_ROW_COUNT),
            columns: columns.max(DEFAULT_COLUMN_COUNT),
        }
    }

    pub fn contains(&self, other: GridSize) -> bool {
        self.rows >= other.rows && self.columns >= other.columns
    }
}

impl WorksheetInfo {
    pub fn grid(&self) -> GridSize {
        GridSize {
            rows: self.row_count,
            columns: self.column_count,
        }
    }
}
