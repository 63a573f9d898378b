use async_trait::async_trait;
use serde_json::Value;

use super::api_model::{GridSize, SpreadsheetRef, WorksheetInfo};
use crate::errors::Result;
use crate::format::ColumnFormat;

/// The subset of the Google Sheets and Drive APIs used for upload.
#[async_trait]
pub trait SpreadsheetApi: Send + Sync {
    /// First spreadsheet with exactly this name, if any.
    async fn find_spreadsheet(&self, name: &str) -> Result<Option<SpreadsheetRef>>;

    async fn create_spreadsheet(&self, name: &str) -> Result<SpreadsheetRef>;

    async fn list_worksheets(&self, spreadsheet_id: &str) -> Result<Vec<WorksheetInfo>>;

    async fn add_worksheet(
        &self,
        spreadsheet_id: &str,
        title: &str,
        size: GridSize,
    ) -> Result<WorksheetInfo>;

    async fn resize_worksheet(&self, spreadsheet_id: &str, sheet_id: i64, size: GridSize)
        -> Result<()>;

    /// Remove every value from the worksheet.
    async fn clear_worksheet(&self, spreadsheet_id: &str, title: &str) -> Result<()>;

    /// Write `values` starting at `A1`.
    async fn update_values(
        &self,
        spreadsheet_id: &str,
        title: &str,
        values: Vec<Vec<Value>>,
    ) -> Result<()>;

    async fn apply_number_formats(
        &self,
        spreadsheet_id: &str,
        sheet_id: i64,
        formats: &[ColumnFormat],
    ) -> Result<()>;
}
