//! Shared record builders for integration tests.

#![allow(dead_code)]

use rust_decimal::Decimal;

use loho_types::config::{
    ChannelConfig, DeductionRule, DistributionConfig, FixedCostConfig, PublisherDeductions,
    TierConfig,
};
use loho_types::records::{ConsumptionRecord, ContentType, SubscriptionRecord};

pub const PERIOD: &str = "2024-01";

/// Annual subscription price in KES.
pub const SUBSCRIPTION_PRICE: i64 = 2_000;

pub fn dec(n: i64) -> Decimal {
    Decimal::new(n, 0)
}

/// USD 750 license at 150 KES/USD, plus KES 200 per active user.
pub fn fixed_costs() -> FixedCostConfig {
    FixedCostConfig {
        period: PERIOD.to_string(),
        external_license_fee_foreign_currency: dec(750),
        exchange_rate_to_local: dec(150),
        per_user_platform_fee: dec(200),
        local_currency: "KES".to_string(),
    }
}

/// Default channels and tiers, the documented fixed costs, and a 5% platform fee.
pub fn config() -> DistributionConfig {
    DistributionConfig {
        channels: ChannelConfig::default(),
        tiers: TierConfig::default(),
        fixed_costs: fixed_costs(),
        deductions: PublisherDeductions::uniform(vec![DeductionRule::platform_fee()]),
    }
}

/// `count` subscribers on `channel`, with ids `{prefix}-{n}`.
pub fn subscribers(prefix: &str, count: usize, channel: &str, tier: &str) -> Vec<SubscriptionRecord> {
    (0..count)
        .map(|n| SubscriptionRecord {
            user_id: format!("{prefix}-{n}"),
            period: PERIOD.to_string(),
            gross_amount: dec(SUBSCRIPTION_PRICE),
            currency: "KES".to_string(),
            distribution_channel: channel.to_string(),
            subscription_tier: tier.to_string(),
        })
        .collect()
}

pub fn consumption(
    publisher: &str,
    content: &str,
    content_type: ContentType,
    raw_metric: i64,
    tier: &str,
) -> ConsumptionRecord {
    ConsumptionRecord {
        user_id: format!("{publisher}-reader"),
        publisher_id: publisher.to_string(),
        content_id: content.to_string(),
        content_type,
        raw_metric: dec(raw_metric),
        subscription_tier: tier.to_string(),
        period: PERIOD.to_string(),
        is_active: true,
    }
}
