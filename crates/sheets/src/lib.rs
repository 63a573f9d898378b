//! lotsync sheets - uploads holdings and tax lots to a Google spreadsheet.
//!
//! [`SpreadsheetManager`] drives the upload through the [`SpreadsheetApi`]
//! trait; [`SheetsApiClient`] implements it over the Sheets and Drive REST
//! APIs with service-account authentication.

pub mod api;
pub mod auth;
pub mod errors;
pub mod format;
pub mod manager;

pub use api::{SheetsApiClient, SpreadsheetApi, SpreadsheetRef};
pub use auth::{AccessTokenSource, ServiceAccountAuth, ServiceAccountKey};
pub use errors::{Result, SheetsError};
pub use manager::{SheetInputs, SheetStatus, SpreadsheetManager, SyncReport};
