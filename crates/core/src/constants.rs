/// CSV file names written to the output directory.
pub const OPEN_TAX_LOTS_CSV: &str = "open_tax_lots.csv";
pub const CLOSED_TAX_LOTS_CSV: &str = "closed_tax_lots.csv";
pub const HOLDINGS_CSV: &str = "holdings.csv";

/// Default output directory for CSV files, relative to the working directory.
pub const DEFAULT_CSV_DIR: &str = "CSV";

/// Default location of the run-settings state file.
pub const DEFAULT_STATE_FILE: &str = "state.json";

/// Worksheet titles.
pub const HOLDINGS_SHEET: &str = "Holdings";
pub const OPEN_TAX_LOTS_SHEET: &str = "Open Tax Lots";
pub const CLOSED_TAX_LOTS_SHEET: &str = "Closed Tax Lots";
pub const SECURITIES_INFO_SHEET: &str = "Securities Info";

/// Spreadsheet number-format patterns.
pub const CURRENCY_PATTERN: &str = "$#,##0.00";
pub const PERCENT_PATTERN: &str = "0.00%";

/// Page sizes requested from the lens API.
pub const TAX_LOTS_PAGE_SIZE: u32 = 2000;
pub const HOLDINGS_PAGE_SIZE: u32 = 100;
