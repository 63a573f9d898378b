//! Contract for fetching portfolio data from the brokerage.

use async_trait::async_trait;

use lotsync_core::holdings::HoldingRecord;
use lotsync_core::tax_lots::LotType;
use lotsync_core::Table;

use crate::graphql::FetchOutcome;

#[async_trait]
pub trait PortfolioFetcherTrait: Send + Sync {
    /// All tax lots of one type, one row per lot, as returned by the API.
    async fn fetch_tax_lots(&self, lot_type: LotType) -> FetchOutcome<Table>;

    /// All positions, flattened, largest value first.
    async fn fetch_holdings(&self) -> FetchOutcome<Vec<HoldingRecord>>;
}
