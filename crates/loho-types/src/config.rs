//! Period configuration tables.
//!
//! Every table is an immutable value passed explicitly into the engine.
//! Nothing here is read from global state.
//!
//! ## Defaults
//!
//! | Table | Key | Value |
//! |---|---|---|
//! | channels | `direct` | retention 1.00 |
//! | channels | `elimu_pepe` | retention 0.70 |
//! | tiers | `dhahabu` | multiplier 1.5 |
//! | tiers | `fedha` | multiplier 1.0 |
//! | deductions | `platform_fee` | 5% |

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money::is_fraction;
use crate::{CurrencyCode, DistributionChannel, Period, PublisherId, SubscriptionTier, TypesError};

/// Direct platform subscriptions.
pub const CHANNEL_DIRECT: &str = "direct";

/// Subscriptions sold through the Elimu Pepe app (Safaricom).
pub const CHANNEL_ELIMU_PEPE: &str = "elimu_pepe";

/// Premium tier.
pub const TIER_DHAHABU: &str = "dhahabu";

/// Standard tier.
pub const TIER_FEDHA: &str = "fedha";

/// Platform fee deduction type.
pub const DEDUCTION_PLATFORM_FEE: &str = "platform_fee";

/// Processing fee deduction type (bank transfer or mobile money charges).
pub const DEDUCTION_PROCESSING_FEE: &str = "processing_fee";

/// Retention fraction per distribution channel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelConfig {
    retention: BTreeMap<DistributionChannel, Decimal>,
}

impl ChannelConfig {
    /// Build a channel table from `(channel, retention_fraction)` pairs.
    pub fn new<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Decimal)>,
        K: Into<DistributionChannel>,
    {
        Self {
            retention: entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Retention fraction for `channel`, if configured.
    pub fn retention_fraction(&self, channel: &str) -> Option<Decimal> {
        self.retention.get(channel).copied()
    }

    /// Every retention fraction must lie in `[0, 1]`.
    pub fn validate(&self) -> Result<(), TypesError> {
        for (channel, fraction) in &self.retention {
            if !is_fraction(*fraction) {
                return Err(TypesError::InvalidConfig(format!(
                    "retention fraction for channel {channel} must be within [0, 1], got {fraction}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self::new([
            (CHANNEL_DIRECT, Decimal::ONE),
            (CHANNEL_ELIMU_PEPE, Decimal::new(70, 2)),
        ])
    }
}

/// Weight multiplier per subscription tier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TierConfig {
    multipliers: BTreeMap<SubscriptionTier, Decimal>,
}

impl TierConfig {
    /// Build a tier table from `(tier, multiplier)` pairs.
    pub fn new<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Decimal)>,
        K: Into<SubscriptionTier>,
    {
        Self {
            multipliers: entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Multiplier for `tier`, if configured.
    pub fn multiplier(&self, tier: &str) -> Option<Decimal> {
        self.multipliers.get(tier).copied()
    }

    /// Every multiplier must be strictly positive.
    pub fn validate(&self) -> Result<(), TypesError> {
        for (tier, multiplier) in &self.multipliers {
            if *multiplier <= Decimal::ZERO {
                return Err(TypesError::InvalidConfig(format!(
                    "multiplier for tier {tier} must be positive, got {multiplier}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for TierConfig {
    fn default() -> Self {
        Self::new([
            (TIER_DHAHABU, Decimal::new(15, 1)),
            (TIER_FEDHA, Decimal::ONE),
        ])
    }
}

/// Fixed costs charged against a period's revenue.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FixedCostConfig {
    pub period: Period,
    /// External license fee, denominated in a foreign currency.
    pub external_license_fee_foreign_currency: Decimal,
    /// Units of local currency per unit of the license fee's currency.
    pub exchange_rate_to_local: Decimal,
    /// Fee per active user, in local currency.
    pub per_user_platform_fee: Decimal,
    pub local_currency: CurrencyCode,
}

impl FixedCostConfig {
    /// All monetary fields must be non-negative.
    pub fn validate(&self) -> Result<(), TypesError> {
        let fields = [
            (
                "external_license_fee_foreign_currency",
                self.external_license_fee_foreign_currency,
            ),
            ("exchange_rate_to_local", self.exchange_rate_to_local),
            ("per_user_platform_fee", self.per_user_platform_fee),
        ];
        for (name, value) in fields {
            if value < Decimal::ZERO {
                return Err(TypesError::InvalidConfig(format!(
                    "{name} for period {} must be non-negative, got {value}",
                    self.period
                )));
            }
        }
        if self.local_currency.is_empty() {
            return Err(TypesError::InvalidConfig(format!(
                "local currency for period {} is empty",
                self.period
            )));
        }
        Ok(())
    }
}

/// A single publisher-level deduction, applied to the running remainder.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
pub struct DeductionRule {
    #[serde(rename = "type")]
    pub rule_type: String,
    /// Fraction in `[0, 1]`.
    #[ts(type = "string")]
    pub percentage: Decimal,
}

impl DeductionRule {
    pub fn new(rule_type: impl Into<String>, percentage: Decimal) -> Self {
        Self {
            rule_type: rule_type.into(),
            percentage,
        }
    }

    /// The standard 5% platform fee.
    pub fn platform_fee() -> Self {
        Self::new(DEDUCTION_PLATFORM_FEE, Decimal::new(5, 2))
    }
}

/// Deduction rules per publisher, with a fallback list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PublisherDeductions {
    /// Applied to publishers without an override.
    #[serde(default = "default_rules")]
    pub default: Vec<DeductionRule>,
    /// Ordered rule lists keyed by publisher.
    #[serde(default)]
    pub publishers: BTreeMap<PublisherId, Vec<DeductionRule>>,
}

fn default_rules() -> Vec<DeductionRule> {
    vec![DeductionRule::platform_fee()]
}

impl PublisherDeductions {
    /// The same rules for every publisher.
    pub fn uniform(rules: Vec<DeductionRule>) -> Self {
        Self {
            default: rules,
            publishers: BTreeMap::new(),
        }
    }

    /// Rules that apply to `publisher_id`.
    pub fn rules_for(&self, publisher_id: &str) -> &[DeductionRule] {
        self.publishers
            .get(publisher_id)
            .map(Vec::as_slice)
            .unwrap_or(&self.default)
    }
}

impl Default for PublisherDeductions {
    fn default() -> Self {
        Self::uniform(default_rules())
    }
}

/// Everything the pipeline needs besides the records themselves.
#[derive(Clone, Debug, PartialEq)]
pub struct DistributionConfig {
    pub channels: ChannelConfig,
    pub tiers: TierConfig,
    pub fixed_costs: FixedCostConfig,
    pub deductions: PublisherDeductions,
}

impl DistributionConfig {
    /// Validate every table.
    pub fn validate(&self) -> Result<(), TypesError> {
        self.channels.validate()?;
        self.tiers.validate()?;
        self.fixed_costs.validate()
    }
}
