//! Input records owned by external ingestion.
//!
//! Records are read-only to the engine. Each belongs to exactly one period.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    ContentId, CurrencyCode, DistributionChannel, Period, PublisherId, SubscriptionTier,
    TypesError, UserId,
};

/// A user's subscription payment for one period.
///
/// One record per user per period. `gross_amount` must be non-negative.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
pub struct SubscriptionRecord {
    pub user_id: UserId,
    pub period: Period,
    /// Amount paid, in `currency`.
    #[ts(type = "string")]
    pub gross_amount: Decimal,
    pub currency: CurrencyCode,
    pub distribution_channel: DistributionChannel,
    pub subscription_tier: SubscriptionTier,
}

/// A single content-consumption measurement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
pub struct ConsumptionRecord {
    pub user_id: UserId,
    pub publisher_id: PublisherId,
    pub content_id: ContentId,
    pub content_type: ContentType,
    /// Pages, minutes, completions, or attempts depending on `content_type`.
    #[ts(type = "string")]
    pub raw_metric: Decimal,
    pub subscription_tier: SubscriptionTier,
    pub period: Period,
    /// Inactive records are excluded from every calculation.
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

/// Kind of content consumed. Determines the unit conversion rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum ContentType {
    /// Measured in pages read.
    Ebook,
    /// Measured in minutes watched.
    Video,
    /// Measured in lab simulation completions.
    Simulation,
    /// Measured in attempts or completions.
    Quiz,
    /// Measured in course completions.
    Course,
}

impl ContentType {
    /// All content types, in declaration order.
    pub const ALL: [ContentType; 5] = [
        ContentType::Ebook,
        ContentType::Video,
        ContentType::Simulation,
        ContentType::Quiz,
        ContentType::Course,
    ];

    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Ebook => "ebook",
            ContentType::Video => "video",
            ContentType::Simulation => "simulation",
            ContentType::Quiz => "quiz",
            ContentType::Course => "course",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = TypesError;

    /// Accepts canonical names and the legacy tracking names
    /// (`eBook`, `Video`, `LabSimulation`, `Quiz`, `Course`), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ebook" => Ok(ContentType::Ebook),
            "video" => Ok(ContentType::Video),
            "simulation" | "labsimulation" | "lab_simulation" => Ok(ContentType::Simulation),
            "quiz" => Ok(ContentType::Quiz),
            "course" => Ok(ContentType::Course),
            _ => Err(TypesError::UnsupportedContentType(s.to_string())),
        }
    }
}

impl TryFrom<String> for ContentType {
    type Error = TypesError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
