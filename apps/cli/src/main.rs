mod config;
mod main_lib;

use std::path::PathBuf;

use clap::Parser;
use config::Config;
use main_lib::{init_tracing, run};

#[derive(Debug, Parser)]
#[command(name = "lotsync")]
#[command(about = "Export brokerage tax lots and holdings to CSV and Google Sheets")]
#[command(version)]
struct Cli {
    /// Run settings file, created with defaults when missing
    #[arg(long)]
    state_file: Option<PathBuf>,

    /// Directory for the CSV files
    #[arg(long)]
    csv_dir: Option<PathBuf>,

    /// Skip login and upload the CSV files already in the CSV directory
    #[arg(long)]
    from_csv: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();
    let config = Config::from_env()?.with_overrides(cli.state_file, cli.csv_dir);
    run(&config, cli.from_csv).await
}
