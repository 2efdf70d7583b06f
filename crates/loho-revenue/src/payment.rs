//! Publisher payments and deductions.
//!
//! ```text
//! gross = publisher_weighted_units * per_unit_value
//! net   = gross, less each deduction applied in order to the running remainder
//! ```
//!
//! With rules `[5%, 2%]` a gross of 100 becomes `100 - 5 = 95`, then
//! `95 - 1.9 = 93.1`. Later deductions never see the original gross.
//!
//! Amounts are carried at full precision and rounded to
//! [`MONEY_SCALE`](loho_types::money::MONEY_SCALE) places on output. The net
//! amount is the rounded gross less the rounded deductions, so every
//! payment balances exactly as written.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use loho_types::config::{DeductionRule, TierConfig};
use loho_types::distribution::{AppliedDeduction, ContentEarning, PublisherPayment};
use loho_types::money::{is_fraction, round_money};
use loho_types::records::{ConsumptionRecord, ContentType};

use crate::units::record_weighted_units;
use crate::{checked_sum, Result, RevenueError};

/// Check every rule's percentage lies in `[0, 1]`.
///
/// # Errors
///
/// - [`RevenueError::InvalidDeductionRule`] for the first rule out of range
pub fn validate_rules(rules: &[DeductionRule]) -> Result<()> {
    match rules.iter().find(|rule| !is_fraction(rule.percentage)) {
        Some(rule) => Err(RevenueError::InvalidDeductionRule {
            rule_type: rule.rule_type.clone(),
            percentage: rule.percentage,
        }),
        None => Ok(()),
    }
}

/// Apply `rules` in order to `gross`, each to what the previous ones left.
///
/// Returns the applied deductions at full precision and the exact remainder.
pub fn apply_deductions(
    gross: Decimal,
    rules: &[DeductionRule],
) -> Result<(Vec<AppliedDeduction>, Decimal)> {
    validate_rules(rules)?;

    let mut remaining = gross;
    let mut applied = Vec::with_capacity(rules.len());

    for rule in rules {
        let amount = remaining
            .checked_mul(rule.percentage)
            .ok_or(RevenueError::Overflow)?;
        remaining = remaining.checked_sub(amount).ok_or(RevenueError::Overflow)?;
        applied.push(AppliedDeduction {
            rule_type: rule.rule_type.clone(),
            percentage: rule.percentage,
            amount,
        });
    }

    Ok((applied, remaining))
}

/// Compute one publisher's payment for `period`.
///
/// Only active records whose `publisher_id` matches are counted; the rest
/// of `consumption` is skipped, so the full period set may be passed.
///
/// # Arguments
///
/// * `publisher_id` - The publisher being paid
/// * `period` - The accounting period
/// * `consumption` - Consumption records (any publisher)
/// * `per_unit_value` - The period's per-unit value from the royalty pool
/// * `tiers` - Tier multipliers
/// * `rules` - Ordered deduction rules for this publisher
/// * `currency` - The period's local currency
///
/// # Errors
///
/// - [`RevenueError::InvalidDeductionRule`] if any rule is out of range
/// - [`RevenueError::InvalidMetric`] / [`RevenueError::UnknownTier`] for a bad record
pub fn compute_payment<'a, I>(
    publisher_id: &str,
    period: &str,
    consumption: I,
    per_unit_value: Decimal,
    tiers: &TierConfig,
    rules: &[DeductionRule],
    currency: &str,
) -> Result<PublisherPayment>
where
    I: IntoIterator<Item = &'a ConsumptionRecord>,
{
    validate_rules(rules)?;

    let mut per_content: BTreeMap<&str, (ContentType, Decimal)> = BTreeMap::new();
    for record in consumption
        .into_iter()
        .filter(|r| r.is_active && r.publisher_id == publisher_id)
    {
        let weighted = record_weighted_units(record, tiers)?;
        let entry = per_content
            .entry(record.content_id.as_str())
            .or_insert((record.content_type, Decimal::ZERO));
        entry.1 = entry.1.checked_add(weighted).ok_or(RevenueError::Overflow)?;
    }

    let total_weighted_units = checked_sum(per_content.values().map(|(_, units)| *units))?;
    let gross = total_weighted_units
        .checked_mul(per_unit_value)
        .ok_or(RevenueError::Overflow)?;

    let (applied, _) = apply_deductions(gross, rules)?;
    let deductions: Vec<AppliedDeduction> = applied
        .into_iter()
        .map(|d| AppliedDeduction {
            amount: round_money(d.amount),
            ..d
        })
        .collect();

    let gross_amount = round_money(gross);
    let total_deductions = checked_sum(deductions.iter().map(|d| d.amount))?;
    let net_amount = gross_amount
        .checked_sub(total_deductions)
        .ok_or(RevenueError::Overflow)?;

    let content_items = per_content
        .into_iter()
        .map(|(content_id, (content_type, units))| -> Result<ContentEarning> {
            let content_gross = units
                .checked_mul(per_unit_value)
                .ok_or(RevenueError::Overflow)?;
            Ok(ContentEarning {
                content_id: content_id.to_string(),
                content_type,
                total_weighted_units: units,
                gross_amount: round_money(content_gross),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(
        publisher_id,
        period,
        units = %total_weighted_units,
        gross = %gross_amount,
        deductions = %total_deductions,
        net = %net_amount,
        "publisher payment computed"
    );

    Ok(PublisherPayment {
        publisher_id: publisher_id.to_string(),
        period: period.to_string(),
        total_weighted_units,
        gross_amount,
        deductions,
        total_deductions,
        net_amount,
        currency: currency.to_string(),
        content_items,
    })
}
