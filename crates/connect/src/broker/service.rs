//! Fetches tax lots and holdings for one account.

use async_trait::async_trait;
use log::{error, info, warn};
use serde_json::Value;
use std::sync::Arc;

use lotsync_core::holdings::HoldingRecord;
use lotsync_core::tax_lots::LotType;
use lotsync_core::{Record, Table};

use super::queries::{holdings_query, holdings_result_path, tax_lots_query, tax_lots_result_path};
use super::traits::PortfolioFetcherTrait;
use crate::errors::ErrorCategory;
use crate::graphql::{fetch_all, FetchOutcome, GraphQlTransport};

/// Paginated fetchers bound to one account.
pub struct PortfolioFetcher {
    transport: Arc<dyn GraphQlTransport>,
    account_id: String,
}

impl PortfolioFetcher {
    pub fn new(transport: Arc<dyn GraphQlTransport>, account_id: impl Into<String>) -> Self {
        Self {
            transport,
            account_id: account_id.into(),
        }
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }
}

/// Tax-lot nodes are kept as-is; a node that is not an object yields an empty record.
fn node_to_record(node: &Value) -> Record {
    node.as_object().cloned().unwrap_or_default()
}

/// Log the outcome of a fetch under `label`.
fn log_outcome<T>(label: &str, outcome: &FetchOutcome<T>, count: impl Fn(&T) -> usize) {
    match outcome {
        FetchOutcome::Ok(value) => info!("Fetched {} {}.", count(value), label),
        FetchOutcome::Empty => warn!("No {} data found in response.", label),
        FetchOutcome::TransportFailure(err) | FetchOutcome::ProtocolFailure(err) => {
            match err.category() {
                ErrorCategory::Transport => error!("Request failed for {}: {}", label, err),
                ErrorCategory::GraphQl => error!("GraphQL errors for {}: {}", label, err),
                ErrorCategory::Decode => error!("Failed to decode {} response: {}", label, err),
            }
        }
    }
}

#[async_trait]
impl PortfolioFetcherTrait for PortfolioFetcher {
    async fn fetch_tax_lots(&self, lot_type: LotType) -> FetchOutcome<Table> {
        let query = tax_lots_query(&self.account_id, lot_type);
        let outcome = fetch_all(
            self.transport.as_ref(),
            &query,
            &tax_lots_result_path(),
            node_to_record,
        )
        .await
        .map(Table::from_records);

        log_outcome(&format!("{} tax lots", lot_type), &outcome, Table::len);
        outcome
    }

    async fn fetch_holdings(&self) -> FetchOutcome<Vec<HoldingRecord>> {
        let query = holdings_query(&self.account_id);
        let outcome = fetch_all(
            self.transport.as_ref(),
            &query,
            &holdings_result_path(),
            HoldingRecord::from_position,
        )
        .await;

        log_outcome("holdings", &outcome, Vec::len);
        outcome
    }
}
