//! Domain models for security lookups.

mod security;

pub use security::SecurityInfo;
