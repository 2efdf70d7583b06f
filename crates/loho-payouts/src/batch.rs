//! Input record batches.
//!
//! A batch is a JSON document holding the subscription and consumption
//! records exported by ingestion, possibly spanning several periods.
//!
//! Consumption is kept as loosely typed [`ConsumptionEntry`] values until a
//! period is selected, so a bad content type fails only its own period.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::Context;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use loho_revenue::RevenueError;
use loho_types::records::{ConsumptionRecord, ContentType, SubscriptionRecord};

/// All records of one input file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordBatch {
    #[serde(default)]
    pub subscriptions: Vec<SubscriptionRecord>,
    #[serde(default)]
    pub consumption: Vec<ConsumptionEntry>,
}

/// A consumption record as exported, with the content type unresolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionEntry {
    pub user_id: String,
    pub publisher_id: String,
    pub content_id: String,
    pub content_type: String,
    pub raw_metric: Decimal,
    pub subscription_tier: String,
    pub period: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl ConsumptionEntry {
    /// Resolve the content type into an engine record.
    pub fn resolve(&self) -> Result<ConsumptionRecord, RevenueError> {
        Ok(ConsumptionRecord {
            user_id: self.user_id.clone(),
            publisher_id: self.publisher_id.clone(),
            content_id: self.content_id.clone(),
            content_type: self.content_type.parse::<ContentType>()?,
            raw_metric: self.raw_metric,
            subscription_tier: self.subscription_tier.clone(),
            period: self.period.clone(),
            is_active: self.is_active,
        })
    }
}

/// The records of a single period.
#[derive(Debug, Clone, Default)]
pub struct PeriodRecords {
    pub subscriptions: Vec<SubscriptionRecord>,
    pub consumption: Vec<ConsumptionRecord>,
}

impl RecordBatch {
    /// Read and parse a batch file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading records {}", path.display()))?;
        let batch: RecordBatch = serde_json::from_str(&content)
            .with_context(|| format!("parsing records {}", path.display()))?;
        Ok(batch)
    }

    /// Every period that appears in the batch, sorted.
    pub fn periods(&self) -> BTreeSet<String> {
        self.subscriptions
            .iter()
            .map(|r| r.period.clone())
            .chain(self.consumption.iter().map(|r| r.period.clone()))
            .collect()
    }

    /// Records belonging to `period`.
    ///
    /// # Errors
    ///
    /// - [`RevenueError::UnsupportedContentType`] if any of the period's
    ///   consumption entries has an unknown content type
    pub fn for_period(&self, period: &str) -> Result<PeriodRecords, RevenueError> {
        let consumption = self
            .consumption
            .iter()
            .filter(|r| r.period == period)
            .map(ConsumptionEntry::resolve)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PeriodRecords {
            subscriptions: self
                .subscriptions
                .iter()
                .filter(|r| r.period == period)
                .cloned()
                .collect(),
            consumption,
        })
    }
}
