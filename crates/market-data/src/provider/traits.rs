//! Lookup trait implemented by market data providers.

use async_trait::async_trait;

use crate::errors::MarketDataError;

use super::capabilities::RateLimit;

/// A source able to classify a ticker symbol (stock, ETF, fund, ...).
#[async_trait]
pub trait SecurityTypeLookup: Send + Sync {
    /// Unique identifier for this provider, e.g. "FINNHUB".
    fn id(&self) -> &'static str;

    /// Rate limiting configuration.
    fn rate_limit(&self) -> RateLimit;

    /// Normalized security type of `symbol`.
    ///
    /// Returns [`MarketDataError::SymbolNotFound`] when the provider has no
    /// exact match.
    async fn lookup_security_type(&self, symbol: &str) -> Result<String, MarketDataError>;
}
