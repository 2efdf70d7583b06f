//! Platform / royalty split.
//!
//! Adjusted revenue is divided between two parties:
//!
//! - **Platform**: LoHo's share
//! - **Royalty pool**: distributed to content publishers
//!
//! The royalty fraction is [`ROYALTY_SPLIT_RATIO`] (50%). The platform share
//! is taken as the remainder so the two halves always sum exactly to the
//! adjusted revenue.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Result, RevenueError};

/// Fraction of adjusted revenue that goes to the royalty pool (0.5).
pub const ROYALTY_SPLIT_RATIO: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

/// Result of splitting a period's adjusted revenue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevenueSplit {
    /// Platform share.
    pub platform_share: Decimal,
    /// Content royalty pool.
    pub royalty_pool: Decimal,
}

/// Split adjusted revenue into platform share and royalty pool.
///
/// Negative adjusted revenue splits into two negative halves.
///
/// # Errors
///
/// - [`RevenueError::Overflow`] on arithmetic overflow
pub fn split(adjusted_revenue: Decimal) -> Result<RevenueSplit> {
    let royalty_pool = adjusted_revenue
        .checked_mul(ROYALTY_SPLIT_RATIO)
        .ok_or(RevenueError::Overflow)?;

    // Platform takes the remainder to avoid rounding loss
    let platform_share = adjusted_revenue
        .checked_sub(royalty_pool)
        .ok_or(RevenueError::Overflow)?;

    tracing::debug!(
        adjusted = %adjusted_revenue,
        platform = %platform_share,
        royalty = %royalty_pool,
        "revenue split"
    );

    Ok(RevenueSplit {
        platform_share,
        royalty_pool,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_ratio_constant() {
        assert_eq!(ROYALTY_SPLIT_RATIO, Decimal::new(5, 1));
    }

    #[test]
    fn test_split_even() {
        let split = split(Decimal::new(1_087_500, 0)).expect("split");
        assert_eq!(split.platform_share, Decimal::new(543_750, 0));
        assert_eq!(split.royalty_pool, Decimal::new(543_750, 0));
        assert_eq!(
            split.platform_share + split.royalty_pool,
            Decimal::new(1_087_500, 0)
        );
    }

    #[test]
    fn test_split_odd_amount_conserved() {
        let adjusted = Decimal::new(333_333_333, 4);
        let split = split(adjusted).expect("split");
        assert_eq!(
            split.platform_share + split.royalty_pool,
            adjusted,
            "must sum to total"
        );
    }

    #[test]
    fn test_split_deficit() {
        let split = split(Decimal::new(-212_500, 0)).expect("split");
        assert_eq!(split.platform_share, Decimal::new(-106_250, 0));
        assert_eq!(split.royalty_pool, Decimal::new(-106_250, 0));
    }

    #[test]
    fn test_split_zero() {
        let split = split(Decimal::ZERO).expect("split");
        assert_eq!(split.platform_share, Decimal::ZERO);
        assert_eq!(split.royalty_pool, Decimal::ZERO);
    }
}
