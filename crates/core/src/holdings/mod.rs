//! Holdings - flattening of position nodes and worksheet preparation.

mod holdings_model;

pub use holdings_model::{
    holdings_table, prepare_holdings_for_sheet, HoldingRecord, HOLDINGS_CURRENCY_COLUMNS,
    HOLDINGS_PERCENT_COLUMNS, HOLDING_COLUMNS,
};
