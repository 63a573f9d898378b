//! Market data providers.

mod capabilities;
mod pacer;
mod traits;

pub mod finnhub;

// Re-exports
pub use capabilities::RateLimit;
pub use pacer::RequestPacer;
pub use traits::SecurityTypeLookup;
