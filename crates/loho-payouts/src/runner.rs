//! Period batch execution.
//!
//! Periods are independent, so each one is computed on the blocking pool
//! while others run. Periods are started in batches of
//! `max_concurrent_periods`; the shutdown signal is checked before each
//! batch, and periods not yet started are reported as cancelled.
//!
//! This is the only place a wall-clock timestamp is taken.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use loho_types::distribution::DistributionResult;

use crate::batch::RecordBatch;
use crate::config::PayoutsConfig;

/// Outcome of one period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Calculated,
    Failed,
    Cancelled,
}

/// A period's result as written to the output file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodReport {
    pub period: String,
    pub status: ReportStatus,
    /// Unix timestamp of completion. None unless calculated.
    pub calculated_at: Option<u64>,
    pub result: Option<DistributionResult>,
    pub error: Option<String>,
}

impl PeriodReport {
    fn calculated(period: &str, result: DistributionResult) -> Self {
        Self {
            period: period.to_string(),
            status: ReportStatus::Calculated,
            calculated_at: Some(unix_now()),
            result: Some(result),
            error: None,
        }
    }

    fn failed(period: &str, error: String) -> Self {
        Self {
            period: period.to_string(),
            status: ReportStatus::Failed,
            calculated_at: None,
            result: None,
            error: Some(error),
        }
    }

    fn cancelled(period: &str) -> Self {
        Self {
            period: period.to_string(),
            status: ReportStatus::Cancelled,
            calculated_at: None,
            result: None,
            error: None,
        }
    }
}

fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Compute one period synchronously.
pub fn compute_period(config: &PayoutsConfig, batch: &RecordBatch, period: &str) -> PeriodReport {
    let dist_config = match config.distribution_config(period) {
        Ok(c) => c,
        Err(e) => {
            warn!(period, "period skipped: {e:#}");
            return PeriodReport::failed(period, format!("{e:#}"));
        }
    };

    let records = match batch.for_period(period) {
        Ok(records) => records,
        Err(e) => {
            error!(period, "invalid records: {e}");
            return PeriodReport::failed(period, e.to_string());
        }
    };
    match loho_revenue::pipeline::run_concurrent(
        period,
        &records.subscriptions,
        &records.consumption,
        &dist_config,
        config.runner.publisher_workers,
    ) {
        Ok(result) => PeriodReport::calculated(period, result),
        Err(e) => {
            error!(period, "distribution failed: {e}");
            PeriodReport::failed(period, e.to_string())
        }
    }
}

/// Compute `periods` in order, returning one report per period.
pub async fn run_periods(
    config: Arc<PayoutsConfig>,
    batch: Arc<RecordBatch>,
    periods: Vec<String>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Vec<PeriodReport> {
    let batch_size = config.runner.max_concurrent_periods.max(1);
    let mut reports = Vec::with_capacity(periods.len());
    let mut cancelled = false;

    for wave in periods.chunks(batch_size) {
        if !cancelled && shutdown_requested(&mut shutdown_rx) {
            warn!(
                remaining = periods.len() - reports.len(),
                "shutdown requested, cancelling remaining periods"
            );
            cancelled = true;
        }
        if cancelled {
            reports.extend(wave.iter().map(|p| PeriodReport::cancelled(p)));
            continue;
        }

        let handles: Vec<_> = wave
            .iter()
            .map(|period| {
                let config = config.clone();
                let batch = batch.clone();
                let period = period.clone();
                tokio::task::spawn_blocking(move || compute_period(&config, &batch, &period))
            })
            .collect();

        for (period, handle) in wave.iter().zip(handles) {
            match handle.await {
                Ok(report) => reports.push(report),
                Err(e) => {
                    error!(period = %period, "period task failed: {e}");
                    reports.push(PeriodReport::failed(period, format!("task failed: {e}")));
                }
            }
        }
    }

    let calculated = reports
        .iter()
        .filter(|r| r.status == ReportStatus::Calculated)
        .count();
    info!(total = reports.len(), calculated, "period batch complete");

    reports
}

fn shutdown_requested(shutdown_rx: &mut broadcast::Receiver<()>) -> bool {
    match shutdown_rx.try_recv() {
        Ok(()) | Err(broadcast::error::TryRecvError::Lagged(_)) => true,
        Err(broadcast::error::TryRecvError::Empty) | Err(broadcast::error::TryRecvError::Closed) => {
            false
        }
    }
}
