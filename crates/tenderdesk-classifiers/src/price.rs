//! Bid-amount classification against a tender's floor and ceiling

use crate::classifier::{PriceAssessment, PriceCategory};
use crate::config::ThresholdConfig;
use crate::format::{format_grouped, format_large_unit};
use tenderdesk_core::TenderSummary;
use tracing::trace;

/// Classifies candidate bid amounts
///
/// Rules are evaluated in order and the first match wins:
/// 1. `amount < floor` → Disqualifying
/// 2. `amount < floor × (1 + floor_margin)` → CautionLow
/// 3. `amount > ceiling` → OverCeiling
/// 4. `amount > ceiling × (1 − ceiling_margin)` → CautionHigh
/// 5. otherwise → Nominal
///
/// A rule whose bound is absent is skipped.
#[derive(Debug, Clone, Default)]
pub struct PriceClassifier {
    config: ThresholdConfig,
}

impl PriceClassifier {
    pub fn new(config: ThresholdConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ThresholdConfig {
        &self.config
    }

    /// Classify `amount`; `None` means there is nothing to assess
    pub fn classify(
        &self,
        amount: Option<u64>,
        floor: Option<u64>,
        ceiling: Option<u64>,
    ) -> Option<PriceAssessment> {
        let amount = amount?;
        let category = self.category(amount, floor, ceiling);
        trace!(amount, ?floor, ?ceiling, category = category.label(), "classified bid amount");

        Some(PriceAssessment {
            amount,
            category,
            grouped: format_grouped(amount),
            large_unit: format_large_unit(amount),
        })
    }

    /// Classify a bid against a tender's own price bounds
    pub fn classify_for(&self, amount: Option<u64>, tender: &TenderSummary) -> Option<PriceAssessment> {
        self.classify(amount, tender.minimum_price, tender.estimated_price)
    }

    fn category(&self, amount: u64, floor: Option<u64>, ceiling: Option<u64>) -> PriceCategory {
        let value = amount as f64;

        if let Some(floor) = floor {
            if amount < floor {
                return PriceCategory::Disqualifying;
            }
            if value < floor as f64 * (1.0 + self.config.floor_margin) {
                return PriceCategory::CautionLow;
            }
        }

        if let Some(ceiling) = ceiling {
            if amount > ceiling {
                return PriceCategory::OverCeiling;
            }
            if value > ceiling as f64 * (1.0 - self.config.ceiling_margin) {
                return PriceCategory::CautionHigh;
            }
        }

        PriceCategory::Nominal
    }

    /// Starting amount for a tender, see [`suggested_bid`]
    pub fn suggested_bid(&self, tender: &TenderSummary) -> Option<u64> {
        suggested_bid(tender, self.config.default_bid_ratio)
    }

    /// Stepper bounded below by the tender's floor (zero when unknown) and
    /// above by its ceiling
    pub fn stepper_for(&self, tender: &TenderSummary) -> PriceStepper {
        PriceStepper::new(self.config.step)
            .with_min(tender.minimum_price.unwrap_or(0))
            .with_max(tender.estimated_price)
    }
}

/// Starting bid for a tender: its minimum price when known, otherwise
/// `floor(estimated_price × ratio)`.
pub fn suggested_bid(tender: &TenderSummary, ratio: f64) -> Option<u64> {
    if let Some(minimum) = tender.minimum_price {
        return Some(minimum);
    }
    tender
        .estimated_price
        .map(|estimated| (estimated as f64 * ratio).floor() as u64)
}

/// Fixed-step increment/decrement for the amount field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceStepper {
    step: u64,
    min: u64,
    max: Option<u64>,
}

impl PriceStepper {
    pub fn new(step: u64) -> Self {
        Self {
            step,
            min: 0,
            max: None,
        }
    }

    pub fn with_min(mut self, min: u64) -> Self {
        self.min = min;
        self
    }

    pub fn with_max(mut self, max: Option<u64>) -> Self {
        self.max = max;
        self
    }

    /// Add one step; an empty field starts from `min`. The amount is left
    /// unchanged when the step would pass `max`.
    pub fn increment(&self, amount: Option<u64>) -> u64 {
        let current = amount.unwrap_or(self.min);
        match current.checked_add(self.step) {
            Some(next) if self.max.map_or(true, |max| next <= max) => next,
            _ => current,
        }
    }

    /// Subtract one step, clamped at `min`
    pub fn decrement(&self, amount: Option<u64>) -> u64 {
        let current = amount.unwrap_or(self.min);
        current.saturating_sub(self.step).max(self.min)
    }
}
