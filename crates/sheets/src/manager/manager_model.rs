use serde::Serialize;

use lotsync_core::Table;

/// Tables available for upload. `None` means the data could not be fetched
/// or loaded, and the matching sheet is skipped.
#[derive(Debug, Clone, Default)]
pub struct SheetInputs {
    pub holdings: Option<Table>,
    pub open_tax_lots: Option<Table>,
    pub closed_tax_lots: Option<Table>,
}

/// What happened to one worksheet during a sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SheetStatus {
    /// Header plus `rows` data rows written.
    Updated { rows: usize },
    /// Nothing to write.
    Skipped { reason: String },
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetOutcome {
    pub title: String,
    #[serde(flatten)]
    pub status: SheetStatus,
}

/// Per-sheet results of a sync, in the order the sheets were attempted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub spreadsheet_id: String,
    pub sheets: Vec<SheetOutcome>,
}

impl SyncReport {
    pub fn new(spreadsheet_id: impl Into<String>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            sheets: Vec::new(),
        }
    }

    pub fn push(&mut self, title: &str, status: SheetStatus) {
        self.sheets.push(SheetOutcome {
            title: title.to_string(),
            status,
        });
    }

    pub fn updated(&self) -> usize {
        self.sheets
            .iter()
            .filter(|s| matches!(s.status, SheetStatus::Updated { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.sheets
            .iter()
            .filter(|s| matches!(s.status, SheetStatus::Failed { .. }))
            .count()
    }

    pub fn status_of(&self, title: &str) -> Option<&SheetStatus> {
        self.sheets
            .iter()
            .find(|s| s.title == title)
            .map(|s| &s.status)
    }
}
