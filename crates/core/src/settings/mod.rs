//! Run settings loaded from the state file.

mod settings_model;
mod settings_store;

pub use settings_model::{RunSettings, DEFAULT_SPREADSHEET_NAME};
pub use settings_store::StateFile;
