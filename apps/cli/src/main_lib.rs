use std::sync::Arc;

use lotsync_connect::{authenticate, LensApiClient, PortfolioFetcher, PortfolioFetcherTrait};
use lotsync_core::constants::HOLDINGS_CSV;
use lotsync_core::holdings::holdings_table;
use lotsync_core::settings::{RunSettings, StateFile};
use lotsync_core::tabular::CsvDirectory;
use lotsync_core::tax_lots::LotType;
use lotsync_core::Table;
use lotsync_market_data::FinnhubProvider;
use lotsync_sheets::{SheetInputs, SheetStatus, SpreadsheetManager, SyncReport};
use tracing::{error, info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;

pub fn init_tracing() {
    let log_format = std::env::var("LOTSYNC_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry.with(fmt::layer().with_target(true)).init();
    }
}

/// One full run: settings, data (fetched or loaded), CSV files, spreadsheet.
pub async fn run(config: &Config, from_csv: bool) -> anyhow::Result<()> {
    let settings = StateFile::new(&config.state_file).load_or_create()?;
    let csv = CsvDirectory::new(&config.csv_dir);

    let inputs = if from_csv {
        info!("Loading data from {}", csv.dir().display());
        load_csv_inputs(&csv)
    } else {
        let inputs = fetch_inputs(config).await?;
        if settings.create_csv_files {
            save_csv_inputs(&csv, &inputs);
        }
        inputs
    };

    if settings.enable_google_sheets_integration {
        let report = sync_spreadsheet(config, &settings, inputs).await?;
        log_report(&report);
    } else {
        info!("Google Sheets integration is disabled");
    }
    Ok(())
}

async fn fetch_inputs(config: &Config) -> anyhow::Result<SheetInputs> {
    let lens = config.lens()?;
    let client = LensApiClient::new(&lens.url, &lens.segment_id)?;
    let session = authenticate(&client, &lens.credentials)
        .await
        .inspect_err(|e| error!("Login failed: {}", e))?;

    let fetcher = PortfolioFetcher::new(Arc::new(client.with_session(&session)), lens.account_id);
    Ok(collect_inputs(&fetcher).await)
}

/// Fetch open lots, closed lots and holdings, one after another. A failed
/// fetch leaves its table unset; an empty one yields an empty table.
pub async fn collect_inputs(fetcher: &dyn PortfolioFetcherTrait) -> SheetInputs {
    let open_tax_lots = fetcher
        .fetch_tax_lots(LotType::Open)
        .await
        .into_option(Table::default);
    let closed_tax_lots = fetcher
        .fetch_tax_lots(LotType::Closed)
        .await
        .into_option(Table::default);
    let holdings = fetcher
        .fetch_holdings()
        .await
        .map(|records| holdings_table(&records))
        .into_option(|| holdings_table(&[]));

    SheetInputs {
        holdings,
        open_tax_lots,
        closed_tax_lots,
    }
}

fn csv_files(inputs: &SheetInputs) -> [(Option<&Table>, &'static str); 3] {
    [
        (inputs.open_tax_lots.as_ref(), LotType::Open.csv_file_name()),
        (inputs.closed_tax_lots.as_ref(), LotType::Closed.csv_file_name()),
        (inputs.holdings.as_ref(), HOLDINGS_CSV),
    ]
}

pub fn save_csv_inputs(csv: &CsvDirectory, inputs: &SheetInputs) {
    for (table, file_name) in csv_files(inputs) {
        let Some(table) = table else {
            warn!("Not writing {}: fetch failed", file_name);
            continue;
        };
        if let Err(e) = csv.save(table, file_name) {
            error!("Failed to write {}: {}", file_name, e);
        }
    }
}

pub fn load_csv_inputs(csv: &CsvDirectory) -> SheetInputs {
    let load = |file_name: &str| match csv.load(file_name) {
        Ok(table) => {
            info!("Loaded {} rows from {}", table.len(), file_name);
            Some(table)
        }
        Err(e) => {
            warn!("Could not load {}: {}", file_name, e);
            None
        }
    };

    SheetInputs {
        open_tax_lots: load(LotType::Open.csv_file_name()),
        closed_tax_lots: load(LotType::Closed.csv_file_name()),
        holdings: load(HOLDINGS_CSV),
    }
}

async fn sync_spreadsheet(
    config: &Config,
    settings: &RunSettings,
    inputs: SheetInputs,
) -> anyhow::Result<SyncReport> {
    let mut manager = SpreadsheetManager::from_credentials(&config.google_credentials, settings)
        .inspect_err(|e| error!("Google Sheets setup failed: {}", e))?;
    if let Some(api_key) = &config.finnhub_api_key {
        manager = manager.with_security_lookup(Arc::new(FinnhubProvider::new(api_key.clone())));
    }

    let report = manager
        .sync(inputs, settings)
        .await
        .inspect_err(|e| error!("Spreadsheet sync aborted: {}", e))?;
    Ok(report)
}

fn log_report(report: &SyncReport) {
    for sheet in &report.sheets {
        match &sheet.status {
            SheetStatus::Updated { rows } => info!("{}: {} rows", sheet.title, rows),
            SheetStatus::Skipped { reason } => info!("{}: skipped ({})", sheet.title, reason),
            SheetStatus::Failed { message } => warn!("{}: failed ({})", sheet.title, message),
        }
    }
}
