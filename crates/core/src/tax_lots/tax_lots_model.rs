//! Tax-lot domain model.
//!
//! Tax lots are passed through from the API unchanged (one record per lot
//! node); typing only happens when a lot table is prepared for a worksheet.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{
    CLOSED_TAX_LOTS_CSV, CLOSED_TAX_LOTS_SHEET, OPEN_TAX_LOTS_CSV, OPEN_TAX_LOTS_SHEET,
};
use crate::tabular::{Coercion, Table};

/// Columns uploaded as text.
pub const TAX_LOT_TEXT_COLUMNS: &[&str] = &[
    "symbol",
    "cusip",
    "acquisitionDate",
    "shortLongTermHolding",
    "closeDate",
];

/// Columns uploaded as numbers.
pub const TAX_LOT_NUMBER_COLUMNS: &[&str] = &[
    "quantity",
    "costBasis",
    "unrealizedGainLoss",
    "shortTermRealizedGainLoss",
    "longTermRealizedGainLoss",
];

/// Columns shown with the currency format.
pub const TAX_LOT_CURRENCY_COLUMNS: &[&str] = &[
    "costBasis",
    "unrealizedGainLoss",
    "shortTermRealizedGainLoss",
    "longTermRealizedGainLoss",
];

pub const WASH_SALE_COLUMN: &str = "washSaleIndicator";

/// Columns never uploaded.
pub const TAX_LOT_DROPPED_COLUMNS: &[&str] = &["id", "__typename"];

/// Open lots are still held; closed lots were sold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LotType {
    Open,
    Closed,
}

impl LotType {
    pub const ALL: [LotType; 2] = [LotType::Open, LotType::Closed];

    /// Value of the `lotType` GraphQL variable.
    pub fn as_api_str(&self) -> &'static str {
        match self {
            LotType::Open => "OPEN",
            LotType::Closed => "CLOSED",
        }
    }

    pub fn csv_file_name(&self) -> &'static str {
        match self {
            LotType::Open => OPEN_TAX_LOTS_CSV,
            LotType::Closed => CLOSED_TAX_LOTS_CSV,
        }
    }

    pub fn sheet_title(&self) -> &'static str {
        match self {
            LotType::Open => OPEN_TAX_LOTS_SHEET,
            LotType::Closed => CLOSED_TAX_LOTS_SHEET,
        }
    }
}

impl fmt::Display for LotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LotType::Open => write!(f, "open"),
            LotType::Closed => write!(f, "closed"),
        }
    }
}

/// Type the columns of a tax-lot table for upload and drop the API ids.
///
/// Columns that are not present are skipped.
pub fn prepare_tax_lots_for_sheet(mut table: Table) -> Table {
    for column in TAX_LOT_TEXT_COLUMNS {
        table.coerce_column(column, Coercion::Text);
    }
    for column in TAX_LOT_NUMBER_COLUMNS {
        table.coerce_column(column, Coercion::Number);
    }
    table.coerce_column(WASH_SALE_COLUMN, Coercion::TriStateBool);
    table.drop_columns(TAX_LOT_DROPPED_COLUMNS);
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_lot_type_strings() {
        assert_eq!(LotType::Open.as_api_str(), "OPEN");
        assert_eq!(LotType::Closed.as_api_str(), "CLOSED");
        assert_eq!(LotType::Open.to_string(), "open");
        assert_eq!(LotType::Closed.csv_file_name(), "closed_tax_lots.csv");
        assert_eq!(LotType::Open.sheet_title(), "Open Tax Lots");
    }

    #[test]
    fn test_lot_type_serialization() {
        let json = serde_json::to_string(&LotType::Closed).unwrap();
        assert_eq!(json, r#""CLOSED""#);
    }

    #[test]
    fn test_prepare_tax_lots_for_sheet() {
        let columns: Vec<String> = [
            "symbol",
            "cusip",
            "acquisitionDate",
            "quantity",
            "costBasis",
            "shortLongTermHolding",
            "unrealizedGainLoss",
            "closeDate",
            "shortTermRealizedGainLoss",
            "longTermRealizedGainLoss",
            "washSaleIndicator",
            "id",
            "__typename",
        ]
        .iter()
        .map(|c| c.to_string())
        .collect();
        let row = vec![
            json!("VTI"),
            json!("922908769"),
            json!("2023-04-03"),
            json!("2.5"),
            json!("512.10"),
            json!("LONG"),
            json!("n/a"),
            Value::Null,
            json!("0"),
            json!("12.75"),
            json!("False"),
            json!("lot-1"),
            json!("TaxLot"),
        ];
        let table = Table::from_rows(columns, vec![row]).unwrap();

        let prepared = prepare_tax_lots_for_sheet(table);

        assert_eq!(prepared.width(), 11);
        assert!(prepared.column_index("id").is_none());
        assert!(prepared.column_index("__typename").is_none());
        let row = &prepared.rows()[0];
        assert_eq!(row[0], json!("VTI"));
        assert_eq!(row[3], json!(2.5));
        assert_eq!(row[4], json!(512.1));
        assert_eq!(row[6], Value::Null);
        assert_eq!(row[7], Value::Null);
        assert_eq!(row[8], json!(0.0));
        assert_eq!(row[10], json!(false));
    }
}
