use serde::{Deserialize, Serialize};

pub const DEFAULT_SPREADSHEET_NAME: &str = "M1 Finance Management";

/// Run toggles persisted in the state file.
///
/// Keys are stored in SCREAMING_SNAKE_CASE; missing keys take their default
/// and unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct RunSettings {
    pub enable_google_sheets_integration: bool,
    pub create_new_spreadsheet: bool,
    pub spreadsheet_name: String,
    pub create_csv_files: bool,
    pub generate_tax_lots_sheets: bool,
    pub generate_securities_info_sheet: bool,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            enable_google_sheets_integration: false,
            create_new_spreadsheet: false,
            spreadsheet_name: DEFAULT_SPREADSHEET_NAME.to_string(),
            create_csv_files: true,
            generate_tax_lots_sheets: true,
            generate_securities_info_sheet: false,
        }
    }
}
