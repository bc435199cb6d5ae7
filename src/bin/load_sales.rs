//! Loads the sales CSV export into the `sales_data` table.
//!
//! Waits for the database to come up, applies migrations, then replaces the
//! table contents with the valid rows of the file.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use sales_dashboard::{
    config,
    db::{self, DbConfig},
    ingest,
    middleware_helpers::RetryConfig,
};

#[derive(Parser, Debug)]
#[command(name = "load-sales", version, about = "Load a sales CSV export into the database")]
struct Cli {
    /// CSV file to import (defaults to `loader.csv_path`)
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Rows per INSERT statement
    #[arg(long)]
    batch_size: Option<usize>,

    /// Connection attempts before giving up
    #[arg(long)]
    max_retries: Option<u32>,

    /// Fixed pause between connection attempts
    #[arg(long)]
    retry_delay_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::load_config().context("failed to load application config")?;
    config::init_tracing(config.log_level(), config.log_json);

    let loader = &config.loader;
    let csv_path = cli.csv.unwrap_or_else(|| loader.csv_path.clone());
    let batch_size = cli.batch_size.unwrap_or(loader.batch_size);
    let retry = RetryConfig::fixed(
        cli.max_retries.unwrap_or(loader.max_retries),
        Duration::from_secs(cli.retry_delay_secs.unwrap_or(loader.retry_delay_secs)),
    );

    let db_config = DbConfig::from(&config);
    let pool = db::connect_with_retry(&db_config, &retry).await?;
    info!("Successfully connected to the database");

    db::run_migrations(&pool)
        .await
        .context("failed to apply migrations")?;

    let summary = ingest::load_csv(&pool, &csv_path, batch_size)
        .await
        .with_context(|| format!("failed to load '{}'", csv_path.display()))?;

    println!(
        "Loaded {} of {} rows into 'sales_data' ({} skipped)",
        summary.rows_inserted, summary.rows_read, summary.rows_skipped
    );
    Ok(())
}
