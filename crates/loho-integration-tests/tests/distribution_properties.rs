//! Integration test: invariants of a period distribution.
//!
//! Covers idempotence, conservation of adjusted revenue, unit
//! non-negativity, monotonicity of publisher earnings, and fail-fast
//! handling of malformed records.

mod common;

use rust_decimal::Decimal;

use common::{config, consumption, dec, subscribers, PERIOD};
use loho_revenue::pipeline;
use loho_revenue::units::{base_units, weighted_units};
use loho_revenue::RevenueError;
use loho_types::config::{
    TierConfig, CHANNEL_DIRECT, CHANNEL_ELIMU_PEPE, TIER_DHAHABU, TIER_FEDHA,
};
use loho_types::records::{ConsumptionRecord, ContentType, SubscriptionRecord};

fn period_inputs() -> (Vec<SubscriptionRecord>, Vec<ConsumptionRecord>) {
    let mut subs = subscribers("direct", 137, CHANNEL_DIRECT, TIER_FEDHA);
    subs.extend(subscribers("elimu", 63, CHANNEL_ELIMU_PEPE, TIER_DHAHABU));

    let cons = vec![
        consumption("pub-a", "book-1", ContentType::Ebook, 137, TIER_DHAHABU),
        consumption("pub-a", "video-1", ContentType::Video, 41, TIER_FEDHA),
        consumption("pub-b", "sim-1", ContentType::Simulation, 7, TIER_DHAHABU),
        consumption("pub-c", "quiz-1", ContentType::Quiz, 19, TIER_FEDHA),
        consumption("pub-c", "course-1", ContentType::Course, 3, TIER_DHAHABU),
    ];
    (subs, cons)
}

#[test]
fn run_is_idempotent() {
    let (subs, cons) = period_inputs();
    let config = config();

    let first = pipeline::run(PERIOD, &subs, &cons, &config).expect("first run");
    let second = pipeline::run(PERIOD, &subs, &cons, &config).expect("second run");
    assert_eq!(first, second);

    let first_json = serde_json::to_string(&first).expect("serialize");
    let second_json = serde_json::to_string(&second).expect("serialize");
    assert_eq!(first_json, second_json);

    let concurrent =
        pipeline::run_concurrent(PERIOD, &subs, &cons, &config, 3).expect("concurrent run");
    assert_eq!(serde_json::to_string(&concurrent).expect("serialize"), first_json);
}

#[test]
fn adjusted_revenue_is_conserved() {
    let (subs, cons) = period_inputs();
    let result = pipeline::run(PERIOD, &subs, &cons, &config()).expect("run");
    let breakdown = &result.royalty_pool.breakdown;

    assert_eq!(
        result.platform_share + result.royalty_pool.total_pool_amount,
        breakdown.adjusted_revenue
    );
    assert_eq!(
        breakdown.channel_adjusted_total - breakdown.fixed_costs,
        breakdown.adjusted_revenue
    );
    assert_eq!(
        breakdown.license_fee_local + breakdown.per_user_fees,
        breakdown.fixed_costs
    );
    assert_eq!(breakdown.active_users, 200);
    assert!(breakdown.adjusted_revenue > Decimal::ZERO);
}

#[test]
fn publisher_gross_sums_to_pool_within_rounding() {
    let (subs, cons) = period_inputs();
    let result = pipeline::run(PERIOD, &subs, &cons, &config()).expect("run");

    let total_gross: Decimal = result.publisher_payments.iter().map(|p| p.gross_amount).sum();
    let drift = (total_gross - result.royalty_pool.total_pool_amount).abs();
    // Each payment rounds once to 4 places
    assert!(drift <= Decimal::new(5, 5) * dec(result.publisher_payments.len() as i64));

    for payment in &result.publisher_payments {
        assert_eq!(payment.gross_amount - payment.total_deductions, payment.net_amount);
    }
}

#[test]
fn units_are_never_negative() {
    let tiers = TierConfig::default();
    for content_type in ContentType::ALL {
        for raw in [0, 1, 9, 10, 11, 12_345] {
            let base = base_units(content_type, dec(raw)).expect("base");
            assert!(base >= Decimal::ZERO);
            for tier in [TIER_DHAHABU, TIER_FEDHA] {
                let weighted = weighted_units(base, tier, &tiers).expect("weighted");
                assert!(weighted >= Decimal::ZERO);
                assert!(weighted >= base);
            }
        }
    }
}

#[test]
fn more_units_never_lower_gross() {
    let (subs, cons) = period_inputs();
    let before = pipeline::run(PERIOD, &subs, &cons, &config()).expect("before");

    let mut more = cons.clone();
    more.push(consumption("pub-b", "sim-2", ContentType::Simulation, 25, TIER_FEDHA));
    let after = pipeline::run(PERIOD, &subs, &more, &config()).expect("after");

    let gross_before = before.payment_for("pub-b").expect("pub-b").gross_amount;
    let gross_after = after.payment_for("pub-b").expect("pub-b").gross_amount;
    assert!(gross_after >= gross_before);
    assert_eq!(
        before.royalty_pool.total_pool_amount,
        after.royalty_pool.total_pool_amount
    );
}

#[test]
fn malformed_record_aborts_period() {
    let (subs, mut cons) = period_inputs();
    cons.push(consumption("pub-d", "video-9", ContentType::Video, -4, TIER_FEDHA));

    let err = pipeline::run(PERIOD, &subs, &cons, &config()).expect_err("negative metric");
    assert!(matches!(err, RevenueError::InvalidMetric { .. }));
}

#[test]
fn unknown_tier_aborts_period() {
    let (subs, mut cons) = period_inputs();
    cons[2].subscription_tier = "shaba".to_string();

    let err = pipeline::run(PERIOD, &subs, &cons, &config()).expect_err("unknown tier");
    assert!(matches!(err, RevenueError::UnknownTier(ref tier) if tier == "shaba"));
}

#[test]
fn record_from_other_period_aborts() {
    let (mut subs, cons) = period_inputs();
    subs[5].period = "2023-12".to_string();

    let err = pipeline::run(PERIOD, &subs, &cons, &config()).expect_err("period");
    assert!(matches!(err, RevenueError::PeriodMismatch { ref actual, .. } if actual == "2023-12"));
}

#[test]
fn foreign_currency_subscription_aborts() {
    let (mut subs, cons) = period_inputs();
    subs[0].currency = "USD".to_string();

    let err = pipeline::run(PERIOD, &subs, &cons, &config()).expect_err("currency");
    assert!(matches!(err, RevenueError::CurrencyMismatch { ref actual, .. } if actual == "USD"));
}

#[test]
fn unknown_channel_aborts() {
    let (mut subs, cons) = period_inputs();
    subs[0].distribution_channel = "kiosk".to_string();

    let err = pipeline::run(PERIOD, &subs, &cons, &config()).expect_err("channel");
    assert!(matches!(err, RevenueError::UnknownChannel(ref channel) if channel == "kiosk"));
}

#[test]
fn deficit_period_pays_nothing() {
    let subs = subscribers("direct", 10, CHANNEL_DIRECT, TIER_FEDHA);
    let cons = vec![consumption("pub-a", "video-1", ContentType::Video, 100, TIER_FEDHA)];

    let result = pipeline::run(PERIOD, &subs, &cons, &config()).expect("run");

    // 20,000 - (112,500 + 2,000) = -94,500
    assert_eq!(result.royalty_pool.breakdown.adjusted_revenue, dec(-94_500));
    assert_eq!(result.platform_share, dec(-47_250));
    assert_eq!(result.royalty_pool.total_pool_amount, dec(-47_250));
    assert_eq!(result.royalty_pool.per_unit_value, Decimal::ZERO);
    assert_eq!(
        result.payment_for("pub-a").expect("pub-a").net_amount,
        Decimal::ZERO
    );
}
