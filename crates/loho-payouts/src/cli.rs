//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

/// Compute LoHo royalty pools and publisher payments for one or more periods.
#[derive(Debug, Parser)]
#[command(name = "loho-payouts", version)]
pub struct Args {
    /// JSON file with `subscriptions` and `consumption` records
    #[arg(long)]
    pub input: PathBuf,

    /// TOML configuration (default: $LOHO_CONFIG or ./loho-payouts.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write results here instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Period to compute; repeatable. Default: every period in the input
    #[arg(long = "period", value_name = "YYYY-MM")]
    pub periods: Vec<String>,
}
