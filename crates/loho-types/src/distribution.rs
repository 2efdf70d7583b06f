//! Derived distribution outputs.
//!
//! These are recomputable from a period's inputs and are never mutated in
//! place; a rerun replaces them.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::records::ContentType;
use crate::{ContentId, CurrencyCode, DistributionChannel, Period, PublisherId, SubscriptionTier};

/// The content royalty pool for a period.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
pub struct RoyaltyPool {
    pub period: Period,
    /// Royalty half of the adjusted revenue.
    #[ts(type = "string")]
    pub total_pool_amount: Decimal,
    /// Sum of weighted units over all active consumption in the period.
    #[ts(type = "string")]
    pub total_weighted_units: Decimal,
    /// `total_pool_amount / total_weighted_units`, or zero for an idle period.
    #[ts(type = "string")]
    pub per_unit_value: Decimal,
    pub breakdown: PoolBreakdown,
}

/// Intermediate values behind a [`RoyaltyPool`], kept for audit.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
pub struct PoolBreakdown {
    /// Distinct subscribing users.
    pub active_users: u64,
    #[ts(type = "string")]
    pub gross_revenue: Decimal,
    /// Revenue retained by distribution partners.
    #[ts(type = "string")]
    pub partner_deductions: Decimal,
    #[ts(type = "string")]
    pub channel_adjusted_total: Decimal,
    /// External license fee converted to local currency.
    #[ts(type = "string")]
    pub license_fee_local: Decimal,
    #[ts(type = "string")]
    pub per_user_fees: Decimal,
    #[ts(type = "string")]
    pub fixed_costs: Decimal,
    /// May be negative when fixed costs exceed channel-adjusted revenue.
    #[ts(type = "string")]
    pub adjusted_revenue: Decimal,
    pub users_by_channel: BTreeMap<DistributionChannel, u64>,
    pub users_by_tier: BTreeMap<SubscriptionTier, u64>,
}

/// A deduction as applied to a publisher's payment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
pub struct AppliedDeduction {
    #[serde(rename = "type")]
    pub rule_type: String,
    #[ts(type = "string")]
    pub percentage: Decimal,
    #[ts(type = "string")]
    pub amount: Decimal,
}

/// Per-content slice of a publisher's earnings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
pub struct ContentEarning {
    pub content_id: ContentId,
    pub content_type: ContentType,
    #[ts(type = "string")]
    pub total_weighted_units: Decimal,
    #[ts(type = "string")]
    pub gross_amount: Decimal,
}

/// Payment owed to one publisher for one period.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
pub struct PublisherPayment {
    pub publisher_id: PublisherId,
    pub period: Period,
    #[ts(type = "string")]
    pub total_weighted_units: Decimal,
    #[ts(type = "string")]
    pub gross_amount: Decimal,
    /// In application order.
    pub deductions: Vec<AppliedDeduction>,
    #[ts(type = "string")]
    pub total_deductions: Decimal,
    /// `gross_amount - total_deductions`.
    #[ts(type = "string")]
    pub net_amount: Decimal,
    pub currency: CurrencyCode,
    /// Sorted by content id.
    pub content_items: Vec<ContentEarning>,
}

/// Complete distribution for a period.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
pub struct DistributionResult {
    pub period: Period,
    pub royalty_pool: RoyaltyPool,
    #[ts(type = "string")]
    pub platform_share: Decimal,
    /// Sorted by publisher id.
    pub publisher_payments: Vec<PublisherPayment>,
}

impl DistributionResult {
    /// Payment for `publisher_id`, if the publisher had activity.
    pub fn payment_for(&self, publisher_id: &str) -> Option<&PublisherPayment> {
        self.publisher_payments
            .binary_search_by(|p| p.publisher_id.as_str().cmp(publisher_id))
            .ok()
            .map(|idx| &self.publisher_payments[idx])
    }
}
