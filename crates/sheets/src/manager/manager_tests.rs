use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use lotsync_core::holdings::{holdings_table, HoldingRecord};
use lotsync_core::settings::RunSettings;
use lotsync_core::tax_lots::LotType;
use lotsync_core::{Record, Table};
use lotsync_market_data::{MarketDataError, RateLimit, SecurityTypeLookup};

use super::*;
use crate::api::{GridSize, SpreadsheetApi, SpreadsheetRef, WorksheetInfo};
use crate::errors::{Result, SheetsError};
use crate::format::{ColumnFormat, NumberFormat};

/// In-memory spreadsheet that records every call.
#[derive(Default)]
struct FakeSheets {
    existing: Option<SpreadsheetRef>,
    worksheets: Mutex<Vec<WorksheetInfo>>,
    values: Mutex<HashMap<String, Vec<Vec<Value>>>>,
    formats: Mutex<HashMap<i64, Vec<ColumnFormat>>>,
    calls: Mutex<Vec<String>>,
    fail_update_for: Option<&'static str>,
}

impl FakeSheets {
    fn with_spreadsheet() -> Self {
        Self {
            existing: Some(SpreadsheetRef {
                id: "sheet-1".into(),
                name: "M1 Finance Management".into(),
            }),
            ..Default::default()
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn values(&self, title: &str) -> Option<Vec<Vec<Value>>> {
        self.values.lock().unwrap().get(title).cloned()
    }

    fn worksheet(&self, title: &str) -> Option<WorksheetInfo> {
        self.worksheets
            .lock()
            .unwrap()
            .iter()
            .find(|w| w.title == title)
            .cloned()
    }

    fn log(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl SpreadsheetApi for FakeSheets {
    async fn find_spreadsheet(&self, name: &str) -> Result<Option<SpreadsheetRef>> {
        self.log(format!("find {name}"));
        Ok(self.existing.clone())
    }

    async fn create_spreadsheet(&self, name: &str) -> Result<SpreadsheetRef> {
        self.log(format!("create {name}"));
        Ok(SpreadsheetRef {
            id: "new-sheet".into(),
            name: name.into(),
        })
    }

    async fn list_worksheets(&self, _spreadsheet_id: &str) -> Result<Vec<WorksheetInfo>> {
        Ok(self.worksheets.lock().unwrap().clone())
    }

    async fn add_worksheet(
        &self,
        _spreadsheet_id: &str,
        title: &str,
        size: GridSize,
    ) -> Result<WorksheetInfo> {
        self.log(format!("add {title} {}x{}", size.rows, size.columns));
        let mut sheets = self.worksheets.lock().unwrap();
        let sheet = WorksheetInfo {
            sheet_id: sheets.len() as i64 + 1,
            title: title.into(),
            row_count: size.rows,
            column_count: size.columns,
        };
        sheets.push(sheet.clone());
        Ok(sheet)
    }

    async fn resize_worksheet(&self, _spreadsheet_id: &str, sheet_id: i64, size: GridSize) -> Result<()> {
        self.log(format!("resize {sheet_id} {}x{}", size.rows, size.columns));
        for sheet in self.worksheets.lock().unwrap().iter_mut() {
            if sheet.sheet_id == sheet_id {
                sheet.row_count = size.rows;
                sheet.column_count = size.columns;
            }
        }
        Ok(())
    }

    async fn clear_worksheet(&self, _spreadsheet_id: &str, title: &str) -> Result<()> {
        self.log(format!("clear {title}"));
        self.values.lock().unwrap().remove(title);
        Ok(())
    }

    async fn update_values(&self, _spreadsheet_id: &str, title: &str, values: Vec<Vec<Value>>) -> Result<()> {
        self.log(format!("update {title}"));
        if self.fail_update_for == Some(title) {
            return Err(SheetsError::Api {
                status: 500,
                message: "Internal error encountered.".into(),
            });
        }
        self.values.lock().unwrap().insert(title.to_string(), values);
        Ok(())
    }

    async fn apply_number_formats(
        &self,
        _spreadsheet_id: &str,
        sheet_id: i64,
        formats: &[ColumnFormat],
    ) -> Result<()> {
        self.formats
            .lock()
            .unwrap()
            .insert(sheet_id, formats.to_vec());
        Ok(())
    }
}

struct FakeLookup;

#[async_trait]
impl SecurityTypeLookup for FakeLookup {
    fn id(&self) -> &'static str {
        "FAKE"
    }

    fn rate_limit(&self) -> RateLimit {
        RateLimit::unlimited()
    }

    async fn lookup_security_type(&self, symbol: &str) -> std::result::Result<String, MarketDataError> {
        match symbol {
            "VTI" => Ok("ETF".into()),
            other => Err(MarketDataError::SymbolNotFound(other.into())),
        }
    }
}

fn settings() -> RunSettings {
    RunSettings {
        enable_google_sheets_integration: true,
        ..RunSettings::default()
    }
}

fn holdings() -> Table {
    holdings_table(&[
        HoldingRecord {
            symbol: Some("VTI".into()),
            descriptor: Some("Vanguard Total Stock Market ETF".into()),
            quantity: Some(10.0),
            average_share_price: Some(210.5),
            total_cost: Some(2105.0),
            current_value: Some(2450.25),
            unrealized_gain: Some(345.25),
            unrealized_gain_percent: Some(12.5),
            maintenance_margin_percent: Some(25.0),
        },
        HoldingRecord {
            symbol: Some("XYZ".into()),
            ..Default::default()
        },
    ])
}

fn lots() -> Table {
    let record = |v: Value| -> Record { v.as_object().unwrap().clone() };
    Table::from_records(vec![
        record(json!({
            "symbol": "VTI", "quantity": "2.5", "costBasis": "512.10",
            "washSaleIndicator": "False", "id": "lot-1", "__typename": "TaxLot"
        })),
        record(json!({
            "symbol": "VXUS", "quantity": 4, "costBasis": 220.0,
            "washSaleIndicator": null, "id": "lot-2", "__typename": "TaxLot"
        })),
    ])
}

fn all_inputs() -> SheetInputs {
    SheetInputs {
        holdings: Some(holdings()),
        open_tax_lots: Some(lots()),
        closed_tax_lots: Some(lots()),
    }
}

#[tokio::test]
async fn test_open_existing_spreadsheet() {
    let api = Arc::new(FakeSheets::with_spreadsheet());
    let manager = SpreadsheetManager::new(api.clone(), &settings());

    let spreadsheet = manager.open_spreadsheet().await.unwrap();

    assert_eq!(spreadsheet.id, "sheet-1");
    assert_eq!(api.calls(), vec!["find M1 Finance Management"]);
}

#[tokio::test]
async fn test_missing_spreadsheet_without_create_aborts_sync() {
    let api = Arc::new(FakeSheets::default());
    let manager = SpreadsheetManager::new(api.clone(), &settings());

    let err = manager.sync(all_inputs(), &settings()).await.unwrap_err();

    assert!(matches!(err, SheetsError::SpreadsheetNotFound(ref name) if name == "M1 Finance Management"));
    assert_eq!(api.calls(), vec!["find M1 Finance Management"]);
}

#[tokio::test]
async fn test_missing_spreadsheet_is_created_when_allowed() {
    let api = Arc::new(FakeSheets::default());
    let settings = RunSettings {
        create_new_spreadsheet: true,
        spreadsheet_name: "Taxes 2024".into(),
        ..settings()
    };
    let manager = SpreadsheetManager::new(api.clone(), &settings);

    let spreadsheet = manager.open_spreadsheet().await.unwrap();

    assert_eq!(spreadsheet.id, "new-sheet");
    assert_eq!(api.calls(), vec!["find Taxes 2024", "create Taxes 2024"]);
}

#[tokio::test]
async fn test_holdings_sheet_values_and_formats() {
    let api = Arc::new(FakeSheets::with_spreadsheet());
    let manager = SpreadsheetManager::new(api.clone(), &settings());
    let spreadsheet = manager.open_spreadsheet().await.unwrap();

    let rows = manager.upload_holdings(&spreadsheet, holdings()).await.unwrap();

    assert_eq!(rows, 2);
    let values = api.values("Holdings").unwrap();
    assert_eq!(values.len(), 3);
    assert_eq!(values[0][0], json!("symbol"));
    assert_eq!(values[0][8], json!("maintenance_margin_percent"));
    assert_eq!(values[1][7], json!(0.125));
    assert_eq!(values[1][8], json!(0.25));
    assert_eq!(values[2][4], Value::Null);

    let sheet = api.worksheet("Holdings").unwrap();
    assert_eq!(sheet.grid(), GridSize { rows: 100, columns: 20 });
    let formats = api.formats.lock().unwrap().get(&sheet.sheet_id).cloned().unwrap();
    let currency: Vec<usize> = formats
        .iter()
        .filter(|f| f.format == NumberFormat::CURRENCY)
        .map(|f| f.column)
        .collect();
    let percent: Vec<String> = formats
        .iter()
        .filter(|f| f.format == NumberFormat::PERCENT)
        .map(|f| f.a1_range())
        .collect();
    assert_eq!(currency, vec![3, 4, 5, 6]);
    assert_eq!(percent, vec!["H2:H3", "I2:I3"]);
}

#[tokio::test]
async fn test_existing_small_worksheet_is_resized() {
    let api = Arc::new(FakeSheets::with_spreadsheet());
    api.worksheets.lock().unwrap().push(WorksheetInfo {
        sheet_id: 9,
        title: "Open Tax Lots".into(),
        row_count: 1,
        column_count: 2,
    });
    let manager = SpreadsheetManager::new(api.clone(), &settings());
    let spreadsheet = manager.open_spreadsheet().await.unwrap();

    manager
        .upload_tax_lots(&spreadsheet, LotType::Open, lots())
        .await
        .unwrap();

    let calls = api.calls();
    assert!(calls.contains(&"resize 9 3x4".to_string()), "{calls:?}");
    assert!(!calls.iter().any(|c| c.starts_with("add")));
    let values = api.values("Open Tax Lots").unwrap();
    assert_eq!(
        values[0],
        vec![json!("symbol"), json!("quantity"), json!("costBasis"), json!("washSaleIndicator")]
    );
    assert_eq!(values[1], vec![json!("VTI"), json!(2.5), json!(512.1), json!(false)]);
    assert_eq!(values[2][3], Value::Null);
}

#[tokio::test]
async fn test_sync_continues_after_failed_sheet() {
    let api = Arc::new(FakeSheets {
        fail_update_for: Some("Open Tax Lots"),
        ..FakeSheets::with_spreadsheet()
    });
    let manager = SpreadsheetManager::new(api.clone(), &settings());

    let report = manager.sync(all_inputs(), &settings()).await.unwrap();

    assert_eq!(report.spreadsheet_id, "sheet-1");
    assert_eq!(report.status_of("Holdings"), Some(&SheetStatus::Updated { rows: 2 }));
    assert!(matches!(
        report.status_of("Open Tax Lots"),
        Some(SheetStatus::Failed { message }) if message.contains("Internal error")
    ));
    assert_eq!(report.status_of("Closed Tax Lots"), Some(&SheetStatus::Updated { rows: 2 }));
    assert_eq!(
        report.status_of("Securities Info"),
        Some(&SheetStatus::Skipped { reason: "disabled".into() })
    );
    assert_eq!(report.updated(), 2);
    assert_eq!(report.failed(), 1);
}

#[tokio::test]
async fn test_tax_lot_sheets_disabled_and_missing_inputs() {
    let api = Arc::new(FakeSheets::with_spreadsheet());
    let settings = RunSettings {
        generate_tax_lots_sheets: false,
        ..settings()
    };
    let manager = SpreadsheetManager::new(api.clone(), &settings);

    let report = manager
        .sync(
            SheetInputs {
                holdings: Some(Table::new(vec!["symbol".into()])),
                ..all_inputs()
            },
            &settings,
        )
        .await
        .unwrap();

    assert_eq!(
        report.status_of("Holdings"),
        Some(&SheetStatus::Skipped { reason: "no rows".into() })
    );
    assert_eq!(
        report.status_of("Open Tax Lots"),
        Some(&SheetStatus::Skipped { reason: "disabled".into() })
    );
    assert_eq!(api.calls(), vec!["find M1 Finance Management"]);
}

#[tokio::test]
async fn test_securities_info_sheet() {
    let api = Arc::new(FakeSheets::with_spreadsheet());
    let settings = RunSettings {
        generate_tax_lots_sheets: false,
        generate_securities_info_sheet: true,
        ..settings()
    };
    let manager = SpreadsheetManager::new(api.clone(), &settings).with_security_lookup(Arc::new(FakeLookup));

    let report = manager
        .sync(
            SheetInputs {
                holdings: Some(holdings()),
                ..SheetInputs::default()
            },
            &settings,
        )
        .await
        .unwrap();

    assert_eq!(
        report.status_of("Securities Info"),
        Some(&SheetStatus::Updated { rows: 2 })
    );
    assert_eq!(
        api.values("Securities Info").unwrap(),
        vec![
            vec![json!("symbol"), json!("descriptor"), json!("security_type")],
            vec![json!("VTI"), json!("Vanguard Total Stock Market ETF"), json!("ETF")],
            vec![json!("XYZ"), Value::Null, Value::Null],
        ]
    );
}

#[tokio::test]
async fn test_securities_info_without_lookup_is_skipped() {
    let api = Arc::new(FakeSheets::with_spreadsheet());
    let settings = RunSettings {
        generate_securities_info_sheet: true,
        ..settings()
    };
    let manager = SpreadsheetManager::new(api, &settings);

    let report = manager.sync(SheetInputs::default(), &settings).await.unwrap();

    assert_eq!(
        report.status_of("Holdings"),
        Some(&SheetStatus::Skipped { reason: "no data".into() })
    );
    assert_eq!(
        report.status_of("Securities Info"),
        Some(&SheetStatus::Skipped { reason: "no market data API key".into() })
    );
}

#[test]
fn test_report_serialization() {
    let mut report = SyncReport::new("sheet-1");
    report.push("Holdings", SheetStatus::Updated { rows: 3 });

    assert_eq!(
        serde_json::to_value(&report).unwrap(),
        json!({
            "spreadsheet_id": "sheet-1",
            "sheets": [{"title": "Holdings", "status": "updated", "rows": 3}]
        })
    );
}
