use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::{error, info};

use largest_banks_etl::config::EtlConfig;
use largest_banks_etl::constants::DEFAULT_CONFIG_PATH;
use largest_banks_etl::infra::http_client::HttpPageSource;
use largest_banks_etl::{logging, pipeline};

#[derive(Parser)]
#[command(name = "largest-banks-etl")]
#[command(about = "Scrape the largest banks table, convert market caps and load them into CSV and SQLite")]
#[command(version)]
struct Cli {
    /// Path to a TOML config file; defaults apply when it does not exist
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Override the page to scrape
    #[arg(long)]
    url: Option<String>,

    /// Override the SQLite database file
    #[arg(long)]
    db: Option<PathBuf>,
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let mut config = EtlConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    if let Some(url) = cli.url {
        config.url = url;
    }
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    config.validate().context("invalid configuration")?;

    let _guard = logging::init_logging(config.log_dir.as_deref());

    let source = HttpPageSource::new(&config.http).context("building HTTP client")?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match pipeline::run(&config, &source, &mut out) {
        Ok(summary) => {
            out.flush()?;
            info!(rows = summary.rows, "Done");
            Ok(())
        }
        Err(e) => {
            error!("ETL run failed: {}", e);
            Err(e).context("ETL run failed")
        }
    }
}
