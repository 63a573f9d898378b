//! lotsync market data - classifies held securities through a market data API.
//!
//! Providers implement [`SecurityTypeLookup`]; [`lookup_security_types`] runs
//! a batch of symbols through one provider, one request at a time.

pub mod errors;
pub mod lookup;
pub mod models;
pub mod provider;

pub use errors::MarketDataError;
pub use lookup::lookup_security_types;
pub use models::SecurityInfo;
pub use provider::finnhub::FinnhubProvider;
pub use provider::{RateLimit, RequestPacer, SecurityTypeLookup};
