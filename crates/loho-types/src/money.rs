//! Monetary rounding.
//!
//! Intermediate sums are carried at full [`Decimal`] precision. Values are
//! rounded to [`MONEY_SCALE`] places only when written into an output record.

use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places kept on monetary outputs.
pub const MONEY_SCALE: u32 = 4;

/// Round a monetary value for output (half away from zero).
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Whether `value` lies in the closed interval `[0, 1]`.
pub fn is_fraction(value: Decimal) -> bool {
    value >= Decimal::ZERO && value <= Decimal::ONE
}
