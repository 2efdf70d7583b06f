//! Royalty pool and per-unit value.
//!
//! The pool for a period is derived in one pass over its subscriptions and
//! one pass over its consumption:
//!
//! ```text
//! channel_adjusted = sum(gross * retention(channel))
//! adjusted         = channel_adjusted - fixed_costs(active_users)
//! pool             = adjusted * ROYALTY_SPLIT_RATIO
//! per_unit_value   = pool / sum(weighted_units)
//! ```
//!
//! An idle period (no weighted units) has a per-unit value of zero. A period
//! in deficit keeps its negative pool amount for audit but also distributes
//! nothing: the per-unit value is never negative.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;

use loho_types::config::{ChannelConfig, FixedCostConfig, TierConfig};
use loho_types::distribution::{PoolBreakdown, RoyaltyPool};
use loho_types::records::{ConsumptionRecord, SubscriptionRecord};

use crate::channel::net_revenue;
use crate::costs::{fixed_costs, subtract_costs};
use crate::split::{split, RevenueSplit};
use crate::units::record_weighted_units;
use crate::{checked_sum, Result, RevenueError};

/// A computed pool together with the split it came from.
///
/// Both halves of `split` derive from the same adjusted revenue, so the
/// platform share never drifts from the pool amount.
#[derive(Clone, Debug, PartialEq)]
pub struct PoolComputation {
    pub pool: RoyaltyPool,
    pub split: RevenueSplit,
}

/// Totals over a period's subscriptions.
#[derive(Debug, Default)]
struct SubscriptionTotals {
    gross: Decimal,
    channel_adjusted: Decimal,
    users: BTreeSet<String>,
    users_by_channel: BTreeMap<String, BTreeSet<String>>,
    users_by_tier: BTreeMap<String, BTreeSet<String>>,
}

fn total_subscriptions(
    subscriptions: &[SubscriptionRecord],
    channels: &ChannelConfig,
    local_currency: &str,
) -> Result<SubscriptionTotals> {
    let mut totals = SubscriptionTotals::default();

    for record in subscriptions {
        if record.gross_amount < Decimal::ZERO {
            return Err(RevenueError::NegativeAmount {
                user_id: record.user_id.clone(),
                amount: record.gross_amount,
            });
        }
        if record.currency != local_currency {
            return Err(RevenueError::CurrencyMismatch {
                expected: local_currency.to_string(),
                actual: record.currency.clone(),
            });
        }

        let net = net_revenue(record.gross_amount, &record.distribution_channel, channels)?;

        totals.gross = totals
            .gross
            .checked_add(record.gross_amount)
            .ok_or(RevenueError::Overflow)?;
        totals.channel_adjusted = totals
            .channel_adjusted
            .checked_add(net)
            .ok_or(RevenueError::Overflow)?;

        totals.users.insert(record.user_id.clone());
        totals
            .users_by_channel
            .entry(record.distribution_channel.clone())
            .or_default()
            .insert(record.user_id.clone());
        totals
            .users_by_tier
            .entry(record.subscription_tier.clone())
            .or_default()
            .insert(record.user_id.clone());
    }

    Ok(totals)
}

/// Sum of weighted units over the active records in `consumption`.
///
/// # Errors
///
/// - [`RevenueError::InvalidMetric`] if any active record has a negative metric
/// - [`RevenueError::UnknownTier`] if any active record's tier is not configured
pub fn total_weighted_units<'a, I>(consumption: I, tiers: &TierConfig) -> Result<Decimal>
where
    I: IntoIterator<Item = &'a ConsumptionRecord>,
{
    let weighted = consumption
        .into_iter()
        .filter(|record| record.is_active)
        .map(|record| record_weighted_units(record, tiers))
        .collect::<Result<Vec<_>>>()?;
    checked_sum(weighted)
}

/// Per-unit value of `pool_amount` over `total_weighted_units`.
///
/// Zero when there are no weighted units or the pool is not positive.
pub fn per_unit_value(pool_amount: Decimal, total_weighted_units: Decimal) -> Result<Decimal> {
    // A negative rate would pay heavier consumers less, so a deficit pays nothing
    if total_weighted_units <= Decimal::ZERO || pool_amount <= Decimal::ZERO {
        return Ok(Decimal::ZERO);
    }
    pool_amount
        .checked_div(total_weighted_units)
        .ok_or(RevenueError::Overflow)
}

/// Compute the royalty pool for `period`.
///
/// Records are assumed to belong to `period`; the pipeline checks this.
/// Inactive consumption records are ignored.
///
/// # Errors
///
/// - [`RevenueError::NegativeAmount`] for a negative subscription amount
/// - [`RevenueError::CurrencyMismatch`] for a subscription not in local currency
/// - [`RevenueError::UnknownChannel`] / [`RevenueError::UnknownTier`] for unconfigured keys
/// - [`RevenueError::InvalidMetric`] for a negative consumption metric
pub fn compute_pool(
    period: &str,
    subscriptions: &[SubscriptionRecord],
    consumption: &[ConsumptionRecord],
    channels: &ChannelConfig,
    fixed_cost_config: &FixedCostConfig,
    tiers: &TierConfig,
) -> Result<PoolComputation> {
    let totals = total_subscriptions(subscriptions, channels, &fixed_cost_config.local_currency)?;
    let active_users = totals.users.len() as u64;

    let costs = fixed_costs(active_users, fixed_cost_config)?;
    let adjusted = subtract_costs(totals.channel_adjusted, &costs, period)?;
    let revenue_split = split(adjusted)?;

    let weighted = total_weighted_units(consumption, tiers)?;
    let unit_value = per_unit_value(revenue_split.royalty_pool, weighted)?;

    if weighted.is_zero() {
        tracing::warn!(period, "no weighted units consumed; nothing to distribute");
    }

    let breakdown = PoolBreakdown {
        active_users,
        gross_revenue: totals.gross,
        partner_deductions: totals
            .gross
            .checked_sub(totals.channel_adjusted)
            .ok_or(RevenueError::Overflow)?,
        channel_adjusted_total: totals.channel_adjusted,
        license_fee_local: costs.license_fee_local,
        per_user_fees: costs.per_user_fees,
        fixed_costs: costs.total,
        adjusted_revenue: adjusted,
        users_by_channel: count_users(totals.users_by_channel),
        users_by_tier: count_users(totals.users_by_tier),
    };

    tracing::debug!(
        period,
        active_users,
        gross = %breakdown.gross_revenue,
        channel_adjusted = %breakdown.channel_adjusted_total,
        fixed_costs = %breakdown.fixed_costs,
        pool = %revenue_split.royalty_pool,
        weighted = %weighted,
        per_unit_value = %unit_value,
        "royalty pool computed"
    );

    Ok(PoolComputation {
        pool: RoyaltyPool {
            period: period.to_string(),
            total_pool_amount: revenue_split.royalty_pool,
            total_weighted_units: weighted,
            per_unit_value: unit_value,
            breakdown,
        },
        split: revenue_split,
    })
}

fn count_users(groups: BTreeMap<String, BTreeSet<String>>) -> BTreeMap<String, u64> {
    groups
        .into_iter()
        .map(|(key, users)| (key, users.len() as u64))
        .collect()
}
