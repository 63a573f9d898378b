//! Spreadsheet sync - one worksheet per table.

mod manager_model;
mod manager_service;

#[cfg(test)]
mod manager_tests;

pub use manager_model::{SheetInputs, SheetOutcome, SheetStatus, SyncReport};
pub use manager_service::{SpreadsheetManager, SECURITIES_INFO_COLUMNS};
