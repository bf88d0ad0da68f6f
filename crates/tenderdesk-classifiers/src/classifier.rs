//! Price categories and the assessment returned for a bid amount

use serde::Serialize;

/// Risk category of a bid amount relative to the tender's price bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceCategory {
    /// Below the minimum price - automatic rejection
    Disqualifying,
    /// Just above the floor - may trigger low-bid scrutiny
    CautionLow,
    /// Above the reference price
    OverCeiling,
    /// Just below the ceiling - weak price competitiveness
    CautionHigh,
    /// Within the acceptable range
    Nominal,
}

impl PriceCategory {
    /// Get a machine-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Disqualifying => "disqualifying",
            Self::CautionLow => "caution_low",
            Self::OverCeiling => "over_ceiling",
            Self::CautionHigh => "caution_high",
            Self::Nominal => "nominal",
        }
    }

    /// Get the localized message shown under the amount field
    pub fn message(&self) -> &'static str {
        match self {
            Self::Disqualifying => "失格リスク：最低制限価格を下回っています",
            Self::CautionLow => "要注意：低入札価格調査の対象となる可能性があります",
            Self::OverCeiling => "予定価格を超過しています",
            Self::CautionHigh => "価格競争力が低い可能性があります",
            Self::Nominal => "適正範囲内です",
        }
    }

    /// Get the presentation severity
    pub fn severity(&self) -> Severity {
        match self {
            Self::Disqualifying | Self::OverCeiling => Severity::Error,
            Self::CautionLow | Self::CautionHigh => Severity::Warning,
            Self::Nominal => Severity::Success,
        }
    }
}

/// How loudly a category is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Success,
}

/// Result of classifying one bid amount
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceAssessment {
    /// The classified amount in yen
    pub amount: u64,

    pub category: PriceCategory,

    /// Grouped-digit rendering, e.g. `123,450,000`
    pub grouped: String,

    /// Large-unit rendering, e.g. `1億2345万円`
    pub large_unit: String,
}

impl PriceAssessment {
    /// Localized message for the category
    pub fn message(&self) -> &'static str {
        self.category.message()
    }

    pub fn severity(&self) -> Severity {
        self.category.severity()
    }

    /// Whether the bid would be rejected outright
    pub fn is_disqualifying(&self) -> bool {
        self.category == PriceCategory::Disqualifying
    }
}
