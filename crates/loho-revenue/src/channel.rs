//! Distribution channel retention.
//!
//! Subscriptions sold through a partner (e.g. the Elimu Pepe app) lose the
//! partner's cut before anything else is computed:
//!
//! ```text
//! net_revenue = gross_amount * retention_fraction(channel)
//! ```

use rust_decimal::Decimal;

use loho_types::config::ChannelConfig;

use crate::{Result, RevenueError};

/// Revenue the platform retains from `gross_amount` sold through `channel`.
///
/// # Errors
///
/// - [`RevenueError::UnknownChannel`] if `channel` is not in `channels`
pub fn net_revenue(gross_amount: Decimal, channel: &str, channels: &ChannelConfig) -> Result<Decimal> {
    let retention = channels
        .retention_fraction(channel)
        .ok_or_else(|| RevenueError::UnknownChannel(channel.to_string()))?;

    gross_amount
        .checked_mul(retention)
        .ok_or(RevenueError::Overflow)
}
