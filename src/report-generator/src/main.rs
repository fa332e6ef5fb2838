//! HTML report generator.
//!
//! Fetches the current FPL data once, runs the player, fixture and transfer
//! analysis and writes four static pages.
//!
//! Usage:
//!   report-generator                      # Write reports/ with defaults
//!   report-generator --out-dir site       # Custom output directory
//!   report-generator --top 15 --max-price 6.5 --horizon 8

mod pages;
mod render;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use rust_decimal::Decimal;
use tracing::info;

use common::{Config, FplClient, TransferAdvisor};

use crate::pages::ReportOptions;

#[derive(Parser, Debug)]
#[command(name = "report-generator")]
#[command(about = "Generate FPL analysis HTML reports")]
struct Args {
    /// Output directory for the HTML files
    #[arg(long, default_value = "reports")]
    out_dir: PathBuf,

    /// Rows per ranking table
    #[arg(long, default_value = "10")]
    top: usize,

    /// Price cap for the best-value table
    #[arg(long, default_value = "7.0")]
    max_price: Decimal,

    /// Fixtures to look ahead on the fixture page
    #[arg(long, default_value = "5")]
    horizon: usize,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("report_generator=info".parse()?)
                .add_directive("common=info".parse()?),
        )
        .init();

    let args = Args::parse();

    let config = Config::from_env().context("Failed to load configuration")?;
    info!("Using FPL API at {}", config.api_base_url);

    let client = FplClient::new(&config).context("Failed to create FPL client")?;
    let advisor = TransferAdvisor::load(&client)
        .await
        .context("Failed to load FPL data")?;

    let options = ReportOptions {
        top: args.top,
        max_price: args.max_price,
        horizon: args.horizon,
    };
    let generated_at = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

    let pages = pages::build_all(&advisor, &options);
    let written = pages::write_reports(&args.out_dir, &pages, &generated_at)?;

    println!("\n{}", "=".repeat(50));
    println!("Generated {} reports in {}", written.len(), args.out_dir.display());
    println!("{}", "=".repeat(50));
    for path in &written {
        println!("  - {}", path.display());
    }

    Ok(())
}
