//! End-to-end period distribution.
//!
//! A run is a single pure pass:
//!
//! 1. Check every record and the fixed-cost table belong to the period
//! 2. Validate configuration and every publisher's deduction rules
//! 3. Compute the royalty pool (and, from the same split, the platform share)
//! 4. Group active consumption by publisher
//! 5. Compute one payment per publisher
//!
//! Any error aborts the whole period. There is no clock, randomness, or
//! shared state, so identical inputs give identical results.
//!
//! [`run_concurrent`] fans step 5 out over scoped threads once the pool is
//! final; its output is identical to [`run`].

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use loho_types::config::{DistributionConfig, PublisherDeductions, TierConfig};
use loho_types::distribution::{DistributionResult, PublisherPayment};
use loho_types::records::{ConsumptionRecord, SubscriptionRecord};

use crate::payment::{compute_payment, validate_rules};
use crate::pool::{compute_pool, PoolComputation};
use crate::{Result, RevenueError};

/// Active consumption grouped by publisher, in publisher order.
type PublisherGroups<'a> = BTreeMap<&'a str, Vec<&'a ConsumptionRecord>>;

/// Read-only inputs shared by every publisher's payment.
#[derive(Clone, Copy)]
struct PaymentContext<'a> {
    period: &'a str,
    per_unit_value: Decimal,
    tiers: &'a TierConfig,
    deductions: &'a PublisherDeductions,
    currency: &'a str,
}

impl PaymentContext<'_> {
    fn pay(&self, publisher_id: &str, records: &[&ConsumptionRecord]) -> Result<PublisherPayment> {
        compute_payment(
            publisher_id,
            self.period,
            records.iter().copied(),
            self.per_unit_value,
            self.tiers,
            self.deductions.rules_for(publisher_id),
            self.currency,
        )
    }
}

/// Compute the full distribution for `period`.
///
/// # Errors
///
/// - [`RevenueError::PeriodMismatch`] if any record or the fixed-cost table
///   belongs to another period
/// - [`RevenueError::InvalidConfig`] / [`RevenueError::InvalidDeductionRule`]
///   for bad configuration
/// - any error from [`compute_pool`] or [`compute_payment`]
pub fn run(
    period: &str,
    subscriptions: &[SubscriptionRecord],
    consumption: &[ConsumptionRecord],
    config: &DistributionConfig,
) -> Result<DistributionResult> {
    let computed = prepare(period, subscriptions, consumption, config)?;
    let ctx = payment_context(period, &computed, config);

    let payments = group_by_publisher(consumption)
        .iter()
        .map(|(publisher_id, records)| ctx.pay(publisher_id, records))
        .collect::<Result<Vec<_>>>()?;

    Ok(finish(period, computed, payments))
}

/// Like [`run`], computing publisher payments on up to `workers` threads.
pub fn run_concurrent(
    period: &str,
    subscriptions: &[SubscriptionRecord],
    consumption: &[ConsumptionRecord],
    config: &DistributionConfig,
    workers: usize,
) -> Result<DistributionResult> {
    let computed = prepare(period, subscriptions, consumption, config)?;
    let ctx = payment_context(period, &computed, config);

    let groups: Vec<(&str, Vec<&ConsumptionRecord>)> =
        group_by_publisher(consumption).into_iter().collect();
    let chunk_size = groups.len().div_ceil(workers.max(1)).max(1);

    let payments = std::thread::scope(|scope| -> Result<Vec<PublisherPayment>> {
        let handles: Vec<_> = groups
            .chunks(chunk_size)
            .map(|chunk| {
                scope.spawn(move || {
                    chunk
                        .iter()
                        .map(|(publisher_id, records)| ctx.pay(publisher_id, records))
                        .collect::<Result<Vec<_>>>()
                })
            })
            .collect();

        let mut payments = Vec::with_capacity(groups.len());
        for handle in handles {
            match handle.join() {
                Ok(chunk) => payments.extend(chunk?),
                Err(panic) => std::panic::resume_unwind(panic),
            }
        }
        Ok(payments)
    })?;

    Ok(finish(period, computed, payments))
}

/// Steps 1 to 3: validation and the royalty pool.
fn prepare(
    period: &str,
    subscriptions: &[SubscriptionRecord],
    consumption: &[ConsumptionRecord],
    config: &DistributionConfig,
) -> Result<PoolComputation> {
    check_periods(period, subscriptions, consumption, config)?;

    config.validate()?;
    validate_rules(&config.deductions.default)?;
    for rules in config.deductions.publishers.values() {
        validate_rules(rules)?;
    }

    compute_pool(
        period,
        subscriptions,
        consumption,
        &config.channels,
        &config.fixed_costs,
        &config.tiers,
    )
}

fn check_periods(
    period: &str,
    subscriptions: &[SubscriptionRecord],
    consumption: &[ConsumptionRecord],
    config: &DistributionConfig,
) -> Result<()> {
    let mismatch = std::iter::once(config.fixed_costs.period.as_str())
        .chain(subscriptions.iter().map(|r| r.period.as_str()))
        .chain(consumption.iter().map(|r| r.period.as_str()))
        .find(|p| *p != period);

    match mismatch {
        Some(actual) => Err(RevenueError::PeriodMismatch {
            expected: period.to_string(),
            actual: actual.to_string(),
        }),
        None => Ok(()),
    }
}

fn payment_context<'a>(
    period: &'a str,
    computed: &PoolComputation,
    config: &'a DistributionConfig,
) -> PaymentContext<'a> {
    PaymentContext {
        period,
        per_unit_value: computed.pool.per_unit_value,
        tiers: &config.tiers,
        deductions: &config.deductions,
        currency: &config.fixed_costs.local_currency,
    }
}

fn group_by_publisher(consumption: &[ConsumptionRecord]) -> PublisherGroups<'_> {
    let mut groups = PublisherGroups::new();
    for record in consumption.iter().filter(|r| r.is_active) {
        groups
            .entry(record.publisher_id.as_str())
            .or_default()
            .push(record);
    }
    groups
}

fn finish(
    period: &str,
    computed: PoolComputation,
    publisher_payments: Vec<PublisherPayment>,
) -> DistributionResult {
    let result = DistributionResult {
        period: period.to_string(),
        royalty_pool: computed.pool,
        platform_share: computed.split.platform_share,
        publisher_payments,
    };

    tracing::info!(
        period,
        publishers = result.publisher_payments.len(),
        pool = %result.royalty_pool.total_pool_amount,
        platform_share = %result.platform_share,
        per_unit_value = %result.royalty_pool.per_unit_value,
        "distribution computed"
    );

    result
}
