//! Tax lots - lot types and worksheet preparation.

mod tax_lots_model;

pub use tax_lots_model::{
    prepare_tax_lots_for_sheet, LotType, TAX_LOT_CURRENCY_COLUMNS, TAX_LOT_DROPPED_COLUMNS,
    TAX_LOT_NUMBER_COLUMNS, TAX_LOT_TEXT_COLUMNS, WASH_SALE_COLUMN,
};
