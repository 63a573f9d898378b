//! Error types for spreadsheet sync.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SheetsError {
    /// The service-account key file is missing or malformed.
    #[error("Invalid service account credentials: {0}")]
    Credentials(String),

    /// Signing the JWT or exchanging it for an access token failed.
    #[error("Token exchange failed: {0}")]
    Token(String),

    /// Network failure before a response was received.
    #[error("Request failed: {0}")]
    Network(String),

    /// A Google API answered with a non-2xx status.
    #[error("Google API error {status}: {message}")]
    Api { status: u16, message: String },

    /// A response body did not have the expected shape.
    #[error("Failed to parse response: {0}")]
    Decode(String),

    /// No spreadsheet with this name is shared with the service account.
    #[error("Spreadsheet not found: {0}")]
    SpreadsheetNotFound(String),

    /// Reading a CSV or other local input failed.
    #[error(transparent)]
    Core(#[from] lotsync_core::Error),
}

pub type Result<T> = std::result::Result<T, SheetsError>;
