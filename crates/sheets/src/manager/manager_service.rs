use std::path::Path;
use std::sync::Arc;

use log::{debug, info, warn};
use serde_json::Value;

use lotsync_core::constants::{HOLDINGS_SHEET, SECURITIES_INFO_SHEET};
use lotsync_core::holdings::{
    prepare_holdings_for_sheet, HOLDINGS_CURRENCY_COLUMNS, HOLDINGS_PERCENT_COLUMNS,
};
use lotsync_core::settings::RunSettings;
use lotsync_core::tax_lots::{prepare_tax_lots_for_sheet, LotType, TAX_LOT_CURRENCY_COLUMNS};
use lotsync_core::Table;
use lotsync_market_data::{lookup_security_types, SecurityInfo, SecurityTypeLookup};

use super::manager_model::{SheetInputs, SheetStatus, SyncReport};
use crate::api::{GridSize, SheetsApiClient, SpreadsheetApi, SpreadsheetRef, WorksheetInfo};
use crate::auth::ServiceAccountAuth;
use crate::errors::{Result, SheetsError};
use crate::format::{column_formats, ColumnFormat, NumberFormat};

pub const SECURITIES_INFO_COLUMNS: [&str; 3] = ["symbol", "descriptor", "security_type"];

/// Uploads tables to the worksheets of one named spreadsheet.
pub struct SpreadsheetManager {
    api: Arc<dyn SpreadsheetApi>,
    spreadsheet_name: String,
    create_if_missing: bool,
    security_lookup: Option<Arc<dyn SecurityTypeLookup>>,
}

impl SpreadsheetManager {
    pub fn new(api: Arc<dyn SpreadsheetApi>, settings: &RunSettings) -> Self {
        Self {
            api,
            spreadsheet_name: settings.spreadsheet_name.clone(),
            create_if_missing: settings.create_new_spreadsheet,
            security_lookup: None,
        }
    }

    /// Manager backed by the Google APIs, authenticated with the service
    /// account key at `credentials_path`.
    pub fn from_credentials(credentials_path: &Path, settings: &RunSettings) -> Result<Self> {
        let auth = ServiceAccountAuth::from_file(credentials_path)?;
        info!("Using service account {}", auth.client_email());
        let api = SheetsApiClient::new(Arc::new(auth));
        Ok(Self::new(Arc::new(api), settings))
    }

    /// Enables the Securities Info sheet.
    pub fn with_security_lookup(mut self, lookup: Arc<dyn SecurityTypeLookup>) -> Self {
        self.security_lookup = Some(lookup);
        self
    }

    pub fn spreadsheet_name(&self) -> &str {
        &self.spreadsheet_name
    }

    /// Find the spreadsheet by name, creating it when allowed.
    pub async fn open_spreadsheet(&self) -> Result<SpreadsheetRef> {
        if let Some(found) = self.api.find_spreadsheet(&self.spreadsheet_name).await? {
            info!("Opened spreadsheet '{}' ({})", found.name, found.id);
            return Ok(found);
        }

        if !self.create_if_missing {
            return Err(SheetsError::SpreadsheetNotFound(
                self.spreadsheet_name.clone(),
            ));
        }

        let created = self.api.create_spreadsheet(&self.spreadsheet_name).await?;
        info!("Created spreadsheet '{}' ({})", created.name, created.id);
        Ok(created)
    }

    /// Existing worksheet grown to at least `needed`, or a new one.
    async fn ensure_worksheet(
        &self,
        spreadsheet_id: &str,
        title: &str,
        needed: GridSize,
    ) -> Result<WorksheetInfo> {
        let existing = self
            .api
            .list_worksheets(spreadsheet_id)
            .await?
            .into_iter()
            .find(|w| w.title == title);

        let Some(mut sheet) = existing else {
            debug!("Adding worksheet '{}'", title);
            return self
                .api
                .add_worksheet(spreadsheet_id, title, GridSize::fitting(needed.rows, needed.columns))
                .await;
        };

        if !sheet.grid().contains(needed) {
            let size = GridSize {
                rows: sheet.row_count.max(needed.rows),
                columns: sheet.column_count.max(needed.columns),
            };
            debug!(
                "Resizing worksheet '{}' to {}x{}",
                title, size.rows, size.columns
            );
            self.api
                .resize_worksheet(spreadsheet_id, sheet.sheet_id, size)
                .await?;
            sheet.row_count = size.rows;
            sheet.column_count = size.columns;
        }
        Ok(sheet)
    }

    /// Replace the contents of worksheet `title` with `table` and apply
    /// `formats`. Returns the number of data rows written.
    pub async fn upload_table(
        &self,
        spreadsheet: &SpreadsheetRef,
        title: &str,
        table: &Table,
        formats: &[ColumnFormat],
    ) -> Result<usize> {
        let needed = GridSize {
            rows: table.len() + 1,
            columns: table.width(),
        };
        let sheet = self.ensure_worksheet(&spreadsheet.id, title, needed).await?;

        self.api.clear_worksheet(&spreadsheet.id, title).await?;
        self.api
            .update_values(&spreadsheet.id, title, table.to_values())
            .await?;
        if !formats.is_empty() {
            let ranges: Vec<String> = formats.iter().map(ColumnFormat::a1_range).collect();
            debug!("Formatting '{}' ranges {}", title, ranges.join(", "));
        }
        self.api
            .apply_number_formats(&spreadsheet.id, sheet.sheet_id, formats)
            .await?;

        info!("Updated sheet '{}' with {} rows", title, table.len());
        Ok(table.len())
    }

    pub async fn upload_holdings(&self, spreadsheet: &SpreadsheetRef, holdings: Table) -> Result<usize> {
        let table = prepare_holdings_for_sheet(holdings);
        let mut formats = column_formats(&table, HOLDINGS_CURRENCY_COLUMNS, NumberFormat::CURRENCY);
        formats.extend(column_formats(&table, HOLDINGS_PERCENT_COLUMNS, NumberFormat::PERCENT));
        self.upload_table(spreadsheet, HOLDINGS_SHEET, &table, &formats)
            .await
    }

    pub async fn upload_tax_lots(
        &self,
        spreadsheet: &SpreadsheetRef,
        lot_type: LotType,
        lots: Table,
    ) -> Result<usize> {
        let table = prepare_tax_lots_for_sheet(lots);
        let formats = column_formats(&table, TAX_LOT_CURRENCY_COLUMNS, NumberFormat::CURRENCY);
        self.upload_table(spreadsheet, lot_type.sheet_title(), &table, &formats)
            .await
    }

    /// Classify every distinct holdings symbol and upload the result.
    pub async fn upload_securities_info(
        &self,
        spreadsheet: &SpreadsheetRef,
        lookup: &dyn SecurityTypeLookup,
        holdings: &Table,
    ) -> Result<usize> {
        let infos = lookup_security_types(lookup, holding_securities(holdings)).await;
        let table = securities_info_table(&infos);
        self.upload_table(spreadsheet, SECURITIES_INFO_SHEET, &table, &[])
            .await
    }

    /// Upload every enabled sheet. Only opening the spreadsheet is fatal;
    /// a failed sheet is logged and recorded and the next one is attempted.
    pub async fn sync(&self, inputs: SheetInputs, settings: &RunSettings) -> Result<SyncReport> {
        let spreadsheet = self.open_spreadsheet().await?;
        let mut report = SyncReport::new(spreadsheet.id.clone());

        let SheetInputs {
            holdings,
            open_tax_lots,
            closed_tax_lots,
        } = inputs;

        let status = match holdings.clone() {
            Some(table) if !table.is_empty() => {
                record(HOLDINGS_SHEET, self.upload_holdings(&spreadsheet, table).await)
            }
            other => skipped(HOLDINGS_SHEET, other.as_ref()),
        };
        report.push(HOLDINGS_SHEET, status);

        for (lot_type, lots) in [
            (LotType::Open, open_tax_lots),
            (LotType::Closed, closed_tax_lots),
        ] {
            let title = lot_type.sheet_title();
            let status = if !settings.generate_tax_lots_sheets {
                disabled(title)
            } else {
                match lots {
                    Some(table) if !table.is_empty() => record(
                        title,
                        self.upload_tax_lots(&spreadsheet, lot_type, table).await,
                    ),
                    other => skipped(title, other.as_ref()),
                }
            };
            report.push(title, status);
        }

        let status = match (&self.security_lookup, settings.generate_securities_info_sheet) {
            (Some(lookup), true) => match holdings {
                Some(table) if !table.is_empty() => record(
                    SECURITIES_INFO_SHEET,
                    self.upload_securities_info(&spreadsheet, lookup.as_ref(), &table)
                        .await,
                ),
                other => skipped(SECURITIES_INFO_SHEET, other.as_ref()),
            },
            (None, true) => {
                warn!(
                    "Skipping sheet '{}': no market data API key configured",
                    SECURITIES_INFO_SHEET
                );
                SheetStatus::Skipped {
                    reason: "no market data API key".to_string(),
                }
            }
            (_, false) => disabled(SECURITIES_INFO_SHEET),
        };
        report.push(SECURITIES_INFO_SHEET, status);

        info!(
            "Spreadsheet sync finished: {} updated, {} failed",
            report.updated(),
            report.failed()
        );
        Ok(report)
    }
}

fn record(title: &str, result: Result<usize>) -> SheetStatus {
    match result {
        Ok(rows) => SheetStatus::Updated { rows },
        Err(e) => {
            warn!("Failed to update sheet '{}': {}", title, e);
            SheetStatus::Failed {
                message: e.to_string(),
            }
        }
    }
}

fn skipped(title: &str, table: Option<&Table>) -> SheetStatus {
    let reason = match table {
        Some(_) => "no rows",
        None => "no data",
    };
    info!("Skipping sheet '{}': {}", title, reason);
    SheetStatus::Skipped {
        reason: reason.to_string(),
    }
}

fn disabled(title: &str) -> SheetStatus {
    debug!("Sheet '{}' is disabled", title);
    SheetStatus::Skipped {
        reason: "disabled".to_string(),
    }
}

/// `(symbol, descriptor)` pairs of a holdings table, in row order.
fn holding_securities(holdings: &Table) -> Vec<(String, Option<String>)> {
    let (Some(symbol), descriptor) = (
        holdings.column_index("symbol"),
        holdings.column_index("descriptor"),
    ) else {
        return Vec::new();
    };

    holdings
        .rows()
        .iter()
        .filter_map(|row| {
            let symbol = row[symbol].as_str()?.to_string();
            let descriptor = descriptor
                .and_then(|i| row[i].as_str())
                .map(str::to_string);
            Some((symbol, descriptor))
        })
        .collect()
}

fn securities_info_table(infos: &[SecurityInfo]) -> Table {
    let text = |s: &Option<String>| s.clone().map(Value::String).unwrap_or(Value::Null);
    Table::from_fixed_rows(
        SECURITIES_INFO_COLUMNS,
        infos.iter().map(|info| {
            [
                Value::String(info.symbol.clone()),
                text(&info.descriptor),
                text(&info.security_type),
            ]
        }),
    )
}
