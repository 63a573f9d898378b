//! GraphQL documents used by the fetchers.

use serde_json::json;

use lotsync_core::constants::{HOLDINGS_PAGE_SIZE, TAX_LOTS_PAGE_SIZE};
use lotsync_core::tax_lots::LotType;

use crate::graphql::{QueryDescriptor, ResultPath};

pub const TAX_LOTS_OPERATION: &str = "AccountTaxLots";
pub const HOLDINGS_OPERATION: &str = "InvestmentsTablePagination";

/// Location of the tax-lot connection in an `AccountTaxLots` response.
pub const TAX_LOTS_RESULT_PATH: &str = "data.node.taxLots";
/// Location of the positions connection in an `InvestmentsTablePagination` response.
pub const HOLDINGS_RESULT_PATH: &str = "data.account.balance.investments.positions";

const TAX_LOTS_QUERY: &str = r#"query AccountTaxLots($id: ID!, $lotType: LotTypeEnum!, $first: Int, $after: String) {
  node(id: $id) {
    ... on Account {
      number
      taxLots(lotType: $lotType, first: $first, after: $after) {
        pageInfo {
          hasNextPage
          endCursor
          __typename
        }
        edges {
          node {
            symbol
            cusip
            acquisitionDate
            quantity
            costBasis
            shortLongTermHolding
            unrealizedGainLoss
            closeDate
            shortTermRealizedGainLoss
            longTermRealizedGainLoss
            washSaleIndicator
            id
            __typename
          }
          __typename
        }
        __typename
      }
      __typename
    }
    __typename
  }
}"#;

const HOLDINGS_QUERY: &str = r#"query InvestmentsTablePagination($accountId: ID!, $first: Int!, $after: String, $positionsSort: [PositionSortOptionInput!]!) {
  account: node(id: $accountId) {
    ... on Account {
      __typename
      id
      balance {
        investments {
          hasPositions
          positions(first: $first, after: $after, sort: $positionsSort) {
            pageInfo {
              hasNextPage
              endCursor
              __typename
            }
            total
            edges {
              cursor
              node {
                ...Investment
                __typename
              }
              __typename
            }
            __typename
          }
          __typename
        }
        __typename
      }
    }
    __typename
  }
}

fragment Investment on Position {
  id
  cost {
    averageSharePrice
    cost
    __typename
  }
  marginability {
    maintenanceEquityRequirementPercent
    __typename
  }
  positionSecurity {
    descriptor
    symbol
    security {
      __typename
      id
      type
      ... on Security {
        symbol
        __typename
      }
    }
    __typename
  }
  quantity
  unrealizedGain {
    gain
    gainPercent
    __typename
  }
  value {
    value
    __typename
  }
  __typename
}"#;

pub fn tax_lots_query(account_id: &str, lot_type: LotType) -> QueryDescriptor {
    QueryDescriptor::new(TAX_LOTS_OPERATION, TAX_LOTS_QUERY)
        .with_variable("id", account_id)
        .with_variable("lotType", lot_type.as_api_str())
        .with_page_size(TAX_LOTS_PAGE_SIZE)
}

/// Positions sorted by value, largest first.
pub fn holdings_query(account_id: &str) -> QueryDescriptor {
    QueryDescriptor::new(HOLDINGS_OPERATION, HOLDINGS_QUERY)
        .with_variable("accountId", account_id)
        .with_page_size(HOLDINGS_PAGE_SIZE)
        .with_variable(
            "positionsSort",
            json!([{"direction": "DESC", "type": "VALUE"}]),
        )
}

pub fn tax_lots_result_path() -> ResultPath {
    ResultPath::parse(TAX_LOTS_RESULT_PATH)
}

pub fn holdings_result_path() -> ResultPath {
    ResultPath::parse(HOLDINGS_RESULT_PATH)
}
