//! Holdings (positions) flattened into one row per position.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::tabular::{Coercion, Table};
use crate::utils::Lookup;

/// Output columns, in order.
pub const HOLDING_COLUMNS: [&str; 9] = [
    "symbol",
    "descriptor",
    "quantity",
    "average_share_price",
    "total_cost",
    "current_value",
    "unrealized_gain",
    "unrealized_gain_percent",
    "maintenance_margin_percent",
];

pub const HOLDINGS_CURRENCY_COLUMNS: &[&str] = &[
    "average_share_price",
    "total_cost",
    "current_value",
    "unrealized_gain",
];

/// Percent columns arrive as whole percentages (12.5 means 12.5%).
pub const HOLDINGS_PERCENT_COLUMNS: &[&str] =
    &["unrealized_gain_percent", "maintenance_margin_percent"];

/// One position, denormalized from the nested `Position` node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HoldingRecord {
    pub symbol: Option<String>,
    pub descriptor: Option<String>,
    pub quantity: Option<f64>,
    pub average_share_price: Option<f64>,
    pub total_cost: Option<f64>,
    pub current_value: Option<f64>,
    pub unrealized_gain: Option<f64>,
    pub unrealized_gain_percent: Option<f64>,
    pub maintenance_margin_percent: Option<f64>,
}

impl HoldingRecord {
    /// Flatten a `Position` node. Each nested object (`positionSecurity`,
    /// `cost`, `value`, `unrealizedGain`, `marginability`) may be absent, in
    /// which case all of its fields are `None`.
    pub fn from_position(node: &Value) -> Self {
        let node = Lookup::new(node);
        let security = node.get("positionSecurity");
        let cost = node.get("cost");
        let value = node.get("value");
        let gain = node.get("unrealizedGain");
        let margin = node.get("marginability");

        Self {
            symbol: security.get("symbol").as_str().map(str::to_string),
            descriptor: security.get("descriptor").as_str().map(str::to_string),
            quantity: node.get("quantity").as_f64(),
            average_share_price: cost.get("averageSharePrice").as_f64(),
            total_cost: cost.get("cost").as_f64(),
            current_value: value.get("value").as_f64(),
            unrealized_gain: gain.get("gain").as_f64(),
            unrealized_gain_percent: gain.get("gainPercent").as_f64(),
            maintenance_margin_percent: margin
                .get("maintenanceEquityRequirementPercent")
                .as_f64(),
        }
    }

    /// Cells in [`HOLDING_COLUMNS`] order.
    pub fn to_row(&self) -> [Value; 9] {
        let text = |s: &Option<String>| s.clone().map(Value::String).unwrap_or(Value::Null);
        let number = |n: &Option<f64>| {
            n.and_then(Number::from_f64)
                .map(Value::Number)
                .unwrap_or(Value::Null)
        };

        [
            text(&self.symbol),
            text(&self.descriptor),
            number(&self.quantity),
            number(&self.average_share_price),
            number(&self.total_cost),
            number(&self.current_value),
            number(&self.unrealized_gain),
            number(&self.unrealized_gain_percent),
            number(&self.maintenance_margin_percent),
        ]
    }
}

/// Table with exactly [`HOLDING_COLUMNS`], one row per record.
pub fn holdings_table(records: &[HoldingRecord]) -> Table {
    Table::from_fixed_rows(HOLDING_COLUMNS, records.iter().map(HoldingRecord::to_row))
}

/// Type the columns of a holdings table for upload. Percentages become
/// fractions so the sheet's `0.00%` format shows them correctly.
pub fn prepare_holdings_for_sheet(mut table: Table) -> Table {
    table.coerce_column("quantity", Coercion::Number);
    for column in HOLDINGS_CURRENCY_COLUMNS {
        table.coerce_column(column, Coercion::Number);
    }
    for column in HOLDINGS_PERCENT_COLUMNS {
        table.coerce_column(column, Coercion::Percent);
    }
    table
}
