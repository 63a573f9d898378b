//! Google Sheets / Drive API access.

mod api_model;
mod api_traits;
mod sheets_client;

pub use api_model::{GridSize, SpreadsheetRef, WorksheetInfo, DEFAULT_COLUMN_COUNT, DEFAULT_ROW_COUNT};
pub use api_traits::SpreadsheetApi;
pub use sheets_client::{SheetsApiClient, DEFAULT_DRIVE_API_URL, DEFAULT_SHEETS_API_URL};
