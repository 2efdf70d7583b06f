//! loho-payouts: period revenue distribution job.
//!
//! Reads exported subscription and consumption records, computes the
//! royalty pool and publisher payments for each period, and writes the
//! results as JSON for the payment-processing and audit collaborators.
//!
//! Usage:
//!   loho-payouts --input records.json                    # every period in the file
//!   loho-payouts --input records.json --period 2024-01   # one period

mod batch;
mod cli;
mod config;
mod runner;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::sync::broadcast;
use tracing::info;

use crate::batch::RecordBatch;
use crate::cli::Args;
use crate::config::PayoutsConfig;
use crate::runner::{run_periods, ReportStatus};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 1. Load config
    let config = PayoutsConfig::load(args.config.as_deref())?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("loho={}", config.logging.level).parse()?),
        )
        .init();

    info!("LoHo payouts starting");

    // 2. Load records
    let batch = RecordBatch::load(&args.input)?;
    let periods: Vec<String> = if args.periods.is_empty() {
        batch.periods().into_iter().collect()
    } else {
        args.periods.clone()
    };
    info!(
        subscriptions = batch.subscriptions.len(),
        consumption = batch.consumption.len(),
        periods = periods.len(),
        "records loaded"
    );

    // 3. Shutdown on Ctrl-C, checked between period batches
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received, finishing running periods");
            let _ = shutdown_tx.send(());
        }
    });

    // 4. Compute
    let reports = run_periods(Arc::new(config), Arc::new(batch), periods, shutdown_rx).await;

    // 5. Write results
    let json = serde_json::to_string_pretty(&reports)?;
    match &args.output {
        Some(path) => std::fs::write(path, json)
            .with_context(|| format!("writing results {}", path.display()))?,
        None => println!("{json}"),
    }

    let failed = reports
        .iter()
        .filter(|r| r.status != ReportStatus::Calculated)
        .count();
    if failed > 0 {
        anyhow::bail!("{failed} of {} periods were not calculated", reports.len());
    }

    info!("LoHo payouts complete");
    Ok(())
}
