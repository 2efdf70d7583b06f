//! Configuration file management.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use loho_types::config::{
    ChannelConfig, DistributionConfig, FixedCostConfig, PublisherDeductions, TierConfig,
};

/// Environment variable overriding the config file path.
pub const CONFIG_ENV_VAR: &str = "LOHO_CONFIG";

/// Config file looked up in the working directory when no path is given.
const DEFAULT_CONFIG_FILE: &str = "loho-payouts.toml";

/// Complete payouts configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PayoutsConfig {
    /// Retention fraction per distribution channel.
    #[serde(default)]
    pub channels: ChannelConfig,
    /// Multiplier per subscription tier.
    #[serde(default)]
    pub tiers: TierConfig,
    /// One entry per period.
    #[serde(default)]
    pub fixed_costs: Vec<FixedCostConfig>,
    /// Publisher deduction rules.
    #[serde(default)]
    pub deductions: PublisherDeductions,
    /// Batch execution settings.
    #[serde(default)]
    pub runner: RunnerConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Batch execution configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Periods computed at the same time. Shutdown is checked between batches.
    #[serde(default = "default_max_concurrent_periods")]
    pub max_concurrent_periods: usize,
    /// Threads used for publisher payments within one period.
    #[serde(default = "default_publisher_workers")]
    pub publisher_workers: usize,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace" | "debug" | "info" | "warn" | "error".
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default value functions

fn default_max_concurrent_periods() -> usize {
    4
}

fn default_publisher_workers() -> usize {
    4
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_periods: default_max_concurrent_periods(),
            publisher_workers: default_publisher_workers(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl PayoutsConfig {
    /// Load configuration.
    ///
    /// An explicit path must exist. Otherwise the path from
    /// [`CONFIG_ENV_VAR`] or `./loho-payouts.toml` is tried, falling back to
    /// defaults if that file does not exist.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let path = Self::config_path();
                if path.exists() {
                    Self::from_file(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Parse a TOML config file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: PayoutsConfig = toml::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    /// Engine configuration for `period`.
    ///
    /// Fails if no fixed-cost entry exists for the period.
    pub fn distribution_config(&self, period: &str) -> anyhow::Result<DistributionConfig> {
        let fixed_costs = self
            .fixed_costs
            .iter()
            .find(|f| f.period == period)
            .cloned()
            .with_context(|| format!("no fixed costs configured for period {period}"))?;

        Ok(DistributionConfig {
            channels: self.channels.clone(),
            tiers: self.tiers.clone(),
            fixed_costs,
            deductions: self.deductions.clone(),
        })
    }

    /// Get the config file path.
    fn config_path() -> PathBuf {
        // Check env var override first
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return PathBuf::from(path);
        }
        PathBuf::from(DEFAULT_CONFIG_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    const SAMPLE: &str = r#"
[channels]
direct = 1.0
elimu_pepe = 0.7
telco = 0.75

[tiers]
dhahabu = 1.5
fedha = 1.0

[[fixed_costs]]
period = "2024-01"
external_license_fee_foreign_currency = 750
exchange_rate_to_local = 150
per_user_platform_fee = 200
local_currency = "KES"

[deductions]
default = [{ type = "platform_fee", percentage = 0.05 }]

[deductions.publishers]
pub-b = [
    { type = "platform_fee", percentage = 0.05 },
    { type = "processing_fee", percentage = 0.01 },
]

[runner]
max_concurrent_periods = 2

[logging]
level = "debug"
"#;

    #[test]
    fn test_default_config() {
        let config = PayoutsConfig::default();
        assert_eq!(config.runner.max_concurrent_periods, 4);
        assert_eq!(config.runner.publisher_workers, 4);
        assert_eq!(config.logging.level, "info");
        assert!(config.fixed_costs.is_empty());
        assert_eq!(config.deductions.default.len(), 1);
    }

    #[test]
    fn test_parse_sample() {
        let config: PayoutsConfig = toml::from_str(SAMPLE).expect("parse");
        assert_eq!(
            config.channels.retention_fraction("telco"),
            Some(Decimal::new(75, 2))
        );
        assert_eq!(config.deductions.rules_for("pub-b").len(), 2);
        assert_eq!(config.runner.max_concurrent_periods, 2);
        assert_eq!(config.runner.publisher_workers, 4);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_distribution_config_for_period() {
        let config: PayoutsConfig = toml::from_str(SAMPLE).expect("parse");
        let dist = config.distribution_config("2024-01").expect("period");
        assert_eq!(
            dist.fixed_costs.exchange_rate_to_local,
            Decimal::new(150, 0)
        );
        dist.validate().expect("valid");
        assert!(config.distribution_config("2024-02").is_err());
    }

    #[test]
    fn test_config_serialization() {
        let config: PayoutsConfig = toml::from_str(SAMPLE).expect("parse");
        let toml_str = toml::to_string(&config).expect("serialize");
        let parsed: PayoutsConfig = toml::from_str(&toml_str).expect("reparse");
        assert_eq!(parsed.channels, config.channels);
        assert_eq!(parsed.fixed_costs, config.fixed_costs);
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let path = std::env::temp_dir().join("loho-payouts-missing-config.toml");
        assert!(PayoutsConfig::load(Some(&path)).is_err());
    }

    #[test]
    fn test_load_explicit_file() {
        let path = std::env::temp_dir().join(format!(
            "loho-payouts-config-{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, SAMPLE).expect("write");
        let config = PayoutsConfig::load(Some(&path)).expect("load");
        let _ = std::fs::remove_file(&path);
        assert_eq!(config.fixed_costs.len(), 1);
    }
}
