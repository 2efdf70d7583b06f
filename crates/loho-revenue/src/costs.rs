//! Fixed cost allocation.
//!
//! Two fixed costs are charged against each period:
//!
//! - an external license fee, billed in a foreign currency and converted to
//!   local currency here, so no foreign amount travels further;
//! - a per-user platform fee for every active subscriber.
//!
//! ```text
//! adjusted = channel_adjusted_total - license_fee * exchange_rate - per_user_fee * active_users
//! ```
//!
//! A negative result is a valid deficit and is propagated, not clamped.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use loho_types::config::FixedCostConfig;

use crate::{Result, RevenueError};

/// Fixed costs for a period, in local currency.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedCosts {
    /// External license fee after currency conversion.
    pub license_fee_local: Decimal,
    /// Per-user fee times active users.
    pub per_user_fees: Decimal,
    /// Sum of the above.
    pub total: Decimal,
}

/// Compute the period's fixed costs.
pub fn fixed_costs(active_user_count: u64, config: &FixedCostConfig) -> Result<FixedCosts> {
    let license_fee_local = config
        .external_license_fee_foreign_currency
        .checked_mul(config.exchange_rate_to_local)
        .ok_or(RevenueError::Overflow)?;

    let per_user_fees = config
        .per_user_platform_fee
        .checked_mul(Decimal::from(active_user_count))
        .ok_or(RevenueError::Overflow)?;

    let total = license_fee_local
        .checked_add(per_user_fees)
        .ok_or(RevenueError::Overflow)?;

    Ok(FixedCosts {
        license_fee_local,
        per_user_fees,
        total,
    })
}

/// Channel-adjusted revenue less the period's fixed costs.
///
/// # Errors
///
/// - [`RevenueError::Overflow`] on arithmetic overflow
pub fn adjusted_revenue(
    channel_adjusted_total: Decimal,
    active_user_count: u64,
    config: &FixedCostConfig,
) -> Result<Decimal> {
    let costs = fixed_costs(active_user_count, config)?;
    subtract_costs(channel_adjusted_total, &costs, &config.period)
}

pub(crate) fn subtract_costs(
    channel_adjusted_total: Decimal,
    costs: &FixedCosts,
    period: &str,
) -> Result<Decimal> {
    let adjusted = channel_adjusted_total
        .checked_sub(costs.total)
        .ok_or(RevenueError::Overflow)?;

    if adjusted < Decimal::ZERO {
        tracing::warn!(
            period,
            channel_adjusted = %channel_adjusted_total,
            fixed_costs = %costs.total,
            adjusted = %adjusted,
            "fixed costs exceed channel-adjusted revenue"
        );
    }

    Ok(adjusted)
}
