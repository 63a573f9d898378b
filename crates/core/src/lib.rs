//! lotsync core - records, tabular results and run settings.
//!
//! This crate has no network code. The `connect` crate produces records from
//! the brokerage API, and the `sheets` crate uploads the tables built here.

pub mod constants;
pub mod errors;
pub mod holdings;
pub mod settings;
pub mod tabular;
pub mod tax_lots;
pub mod utils;

// Re-export error types
pub use errors::Error;
pub use errors::Result;

pub use tabular::{Record, Table};
