//! # loho-revenue
//!
//! Revenue distribution engine.
//!
//! Subscription revenue is reduced by distribution-channel retention and
//! fixed costs, then split 50/50 between the platform and a content royalty
//! pool. The pool is distributed to publishers in proportion to the weighted
//! units their content earned during the period.
//!
//! Every function here is pure and synchronous. Inputs are validated
//! fail-fast: one malformed record aborts the whole period.
//!
//! ## Modules
//!
//! - [`units`]: Content unit conversion and tier weighting
//! - [`channel`]: Distribution channel retention
//! - [`costs`]: Fixed cost allocation
//! - [`split`]: Platform / royalty split
//! - [`pool`]: Royalty pool and per-unit value
//! - [`payment`]: Publisher payments and deductions
//! - [`pipeline`]: End-to-end period distribution

pub mod channel;
pub mod costs;
pub mod payment;
pub mod pipeline;
pub mod pool;
pub mod split;
pub mod units;

use rust_decimal::Decimal;

use loho_types::TypesError;

/// Error types for revenue operations.
#[derive(Debug, thiserror::Error)]
pub enum RevenueError {
    /// Raw consumption metric is negative.
    #[error("invalid metric: raw consumption must be non-negative, got {value}")]
    InvalidMetric {
        /// The offending metric.
        value: Decimal,
    },

    /// Content type is not one of the known kinds.
    #[error("unsupported content type: {0}")]
    UnsupportedContentType(String),

    /// Tier is absent from the tier configuration.
    #[error("unknown subscription tier: {0}")]
    UnknownTier(String),

    /// Channel is absent from the channel configuration.
    #[error("unknown distribution channel: {0}")]
    UnknownChannel(String),

    /// Deduction percentage outside `[0, 1]`.
    #[error("invalid deduction rule {rule_type}: percentage {percentage} outside [0, 1]")]
    InvalidDeductionRule {
        /// The rule's type label.
        rule_type: String,
        /// The offending percentage.
        percentage: Decimal,
    },

    /// A record belongs to a different period than the run.
    #[error("period mismatch: expected {expected}, got {actual}")]
    PeriodMismatch {
        /// The period being computed.
        expected: String,
        /// The record's period.
        actual: String,
    },

    /// Subscription amount is negative.
    #[error("negative gross amount {amount} for user {user_id}")]
    NegativeAmount {
        /// The subscribing user.
        user_id: String,
        /// The offending amount.
        amount: Decimal,
    },

    /// Money in a currency other than the period's local currency.
    #[error("currency mismatch: expected {expected}, got {actual}")]
    CurrencyMismatch {
        /// The period's local currency.
        expected: String,
        /// The record's currency.
        actual: String,
    },

    /// Configuration value out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Arithmetic overflow.
    #[error("arithmetic overflow in revenue calculation")]
    Overflow,
}

impl From<TypesError> for RevenueError {
    fn from(err: TypesError) -> Self {
        match err {
            TypesError::UnsupportedContentType(s) => RevenueError::UnsupportedContentType(s),
            TypesError::InvalidConfig(s) => RevenueError::InvalidConfig(s),
        }
    }
}

/// Convenience result type for revenue operations.
pub type Result<T> = std::result::Result<T, RevenueError>;

/// Sum decimals, failing on overflow.
pub(crate) fn checked_sum<I>(values: I) -> Result<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    values.into_iter().try_fold(Decimal::ZERO, |acc, v| {
        acc.checked_add(v).ok_or(RevenueError::Overflow)
    })
}
