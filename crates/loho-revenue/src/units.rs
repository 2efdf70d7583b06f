//! Content unit conversion and tier weighting.
//!
//! Raw consumption is normalized into base units so that different kinds of
//! content can share one royalty pool:
//!
//! | Content type | Raw metric | Base units |
//! |---|---|---|
//! | ebook | pages read | pages / 10 |
//! | video | minutes watched | minutes |
//! | simulation | completions | completions |
//! | quiz | attempts | attempts |
//! | course | completions | completions |
//!
//! Base units are then scaled by the consuming user's tier multiplier.

use rust_decimal::Decimal;

use loho_types::config::TierConfig;
use loho_types::records::{ConsumptionRecord, ContentType};

use crate::{Result, RevenueError};

/// Pages of an ebook that make up one base unit.
pub const EBOOK_PAGES_PER_UNIT: Decimal = Decimal::TEN;

/// Convert a raw consumption metric into base units.
///
/// # Errors
///
/// - [`RevenueError::InvalidMetric`] if `raw_metric` is negative
pub fn base_units(content_type: ContentType, raw_metric: Decimal) -> Result<Decimal> {
    if raw_metric < Decimal::ZERO {
        return Err(RevenueError::InvalidMetric { value: raw_metric });
    }

    let units = match content_type {
        ContentType::Ebook => raw_metric
            .checked_div(EBOOK_PAGES_PER_UNIT)
            .ok_or(RevenueError::Overflow)?,
        ContentType::Video | ContentType::Simulation | ContentType::Quiz | ContentType::Course => {
            raw_metric
        }
    };

    Ok(units)
}

/// Convert a raw metric for a content type given by name.
///
/// # Errors
///
/// - [`RevenueError::UnsupportedContentType`] if `content_type` is not recognized
/// - [`RevenueError::InvalidMetric`] if `raw_metric` is negative
pub fn base_units_for(content_type: &str, raw_metric: Decimal) -> Result<Decimal> {
    let content_type: ContentType = content_type.parse()?;
    base_units(content_type, raw_metric)
}

/// Scale base units by the tier multiplier.
///
/// # Errors
///
/// - [`RevenueError::UnknownTier`] if `tier` is not in `tiers`
pub fn weighted_units(base_units: Decimal, tier: &str, tiers: &TierConfig) -> Result<Decimal> {
    let multiplier = tiers
        .multiplier(tier)
        .ok_or_else(|| RevenueError::UnknownTier(tier.to_string()))?;

    base_units
        .checked_mul(multiplier)
        .ok_or(RevenueError::Overflow)
}

/// Weighted units earned by a single consumption record.
pub fn record_weighted_units(record: &ConsumptionRecord, tiers: &TierConfig) -> Result<Decimal> {
    let base = base_units(record.content_type, record.raw_metric)?;
    let weighted = weighted_units(base, &record.subscription_tier, tiers)?;

    tracing::trace!(
        content_id = %record.content_id,
        content_type = %record.content_type,
        raw = %record.raw_metric,
        base = %base,
        weighted = %weighted,
        "consumption weighted"
    );

    Ok(weighted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use loho_types::config::{TIER_DHAHABU, TIER_FEDHA};

    fn dec(n: i64) -> Decimal {
        Decimal::new(n, 0)
    }

    #[test]
    fn test_ebook_pages_to_units() {
        assert_eq!(base_units(ContentType::Ebook, dec(50)).expect("ebook"), dec(5));
        assert_eq!(
            base_units(ContentType::Ebook, dec(7)).expect("ebook"),
            Decimal::new(7, 1)
        );
    }

    #[test]
    fn test_identity_conversions() {
        for ty in [
            ContentType::Video,
            ContentType::Simulation,
            ContentType::Quiz,
            ContentType::Course,
        ] {
            assert_eq!(base_units(ty, dec(30)).expect("convert"), dec(30));
        }
    }

    #[test]
    fn test_zero_metric() {
        for ty in ContentType::ALL {
            assert_eq!(base_units(ty, Decimal::ZERO).expect("zero"), Decimal::ZERO);
        }
    }

    #[test]
    fn test_negative_metric_rejected() {
        let err = base_units(ContentType::Video, dec(-1)).expect_err("negative");
        assert!(matches!(err, RevenueError::InvalidMetric { .. }));
    }

    #[test]
    fn test_base_units_for_unknown_type() {
        let err = base_units_for("podcast", dec(3)).expect_err("unknown");
        assert!(matches!(err, RevenueError::UnsupportedContentType(ref s) if s == "podcast"));
        assert_eq!(base_units_for("eBook", dec(20)).expect("ebook"), dec(2));
    }

    #[test]
    fn test_weighted_units_by_tier() {
        let tiers = TierConfig::default();
        assert_eq!(
            weighted_units(dec(5), TIER_DHAHABU, &tiers).expect("dhahabu"),
            Decimal::new(75, 1)
        );
        assert_eq!(weighted_units(dec(20), TIER_FEDHA, &tiers).expect("fedha"), dec(20));
    }

    #[test]
    fn test_weighted_units_unknown_tier() {
        let tiers = TierConfig::default();
        let err = weighted_units(dec(5), "platinum", &tiers).expect_err("unknown");
        assert!(matches!(err, RevenueError::UnknownTier(ref s) if s == "platinum"));
    }

    #[test]
    fn test_record_weighted_units() {
        let record = ConsumptionRecord {
            user_id: "u1".to_string(),
            publisher_id: "p1".to_string(),
            content_id: "book-1".to_string(),
            content_type: ContentType::Ebook,
            raw_metric: dec(50),
            subscription_tier: TIER_DHAHABU.to_string(),
            period: "2024-01".to_string(),
            is_active: true,
        };
        let weighted = record_weighted_units(&record, &TierConfig::default()).expect("weigh");
        assert_eq!(weighted, Decimal::new(75, 1));
    }
}
