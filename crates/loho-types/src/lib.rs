//! # loho-types
//!
//! Shared domain types for LoHo revenue distribution.
//!
//! Input records are produced by external ingestion (subscriptions and
//! content-consumption tracking). Configuration tables are supplied once
//! per period. Output structures are derived, replaceable, and scoped to a
//! single period.
//!
//! ## Modules
//!
//! - [`records`]: Subscription and consumption input records
//! - [`config`]: Channel, tier, fixed-cost, and deduction configuration
//! - [`distribution`]: Royalty pool and publisher payment outputs
//! - [`money`]: Rounding rules for monetary outputs

pub mod config;
pub mod distribution;
pub mod money;
pub mod records;

/// Common type aliases.
pub type UserId = String;
pub type PublisherId = String;
pub type ContentId = String;
/// Accounting period, formatted `YYYY-MM`.
pub type Period = String;
/// Distribution channel key, e.g. `"direct"` or `"elimu_pepe"`.
pub type DistributionChannel = String;
/// Subscription tier key, e.g. `"dhahabu"` or `"fedha"`.
pub type SubscriptionTier = String;
/// ISO 4217 currency code.
pub type CurrencyCode = String;

/// Error types for parsing and validating shared types.
#[derive(Debug, thiserror::Error)]
pub enum TypesError {
    /// Content type string does not name a known content type.
    #[error("unsupported content type: {0}")]
    UnsupportedContentType(String),

    /// Configuration value out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
