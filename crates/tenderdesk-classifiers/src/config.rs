//! Configuration for price classification

use serde::{Deserialize, Serialize};
use tenderdesk_core::{Error, Result};

/// Thresholds and defaults for the bid-amount field
///
/// The floor and ceiling margins are independent settings; they are not
/// derived from one another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Fraction above the floor that still counts as low-bid caution
    #[serde(default = "default_floor_margin")]
    pub floor_margin: f64,

    /// Fraction below the ceiling that counts as weak competitiveness
    #[serde(default = "default_ceiling_margin")]
    pub ceiling_margin: f64,

    /// Share of the estimated price suggested when a tender has no floor
    #[serde(default = "default_bid_ratio")]
    pub default_bid_ratio: f64,

    /// Increment used by the amount stepper (yen)
    #[serde(default = "default_step")]
    pub step: u64,
}

impl ThresholdConfig {
    /// Reject margins and ratios that would make the categories meaningless
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("floor_margin", self.floor_margin),
            ("ceiling_margin", self.ceiling_margin),
        ] {
            if !(0.0..1.0).contains(&value) {
                return Err(Error::config(format!(
                    "pricing.{} must be in [0, 1), got {}",
                    name, value
                )));
            }
        }
        if !(self.default_bid_ratio > 0.0 && self.default_bid_ratio <= 1.0) {
            return Err(Error::config(format!(
                "pricing.default_bid_ratio must be in (0, 1], got {}",
                self.default_bid_ratio
            )));
        }
        if self.step == 0 {
            return Err(Error::config("pricing.step must be positive"));
        }
        Ok(())
    }
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            floor_margin: default_floor_margin(),
            ceiling_margin: default_ceiling_margin(),
            default_bid_ratio: default_bid_ratio(),
            step: default_step(),
        }
    }
}

fn default_floor_margin() -> f64 {
    0.02
}

fn default_ceiling_margin() -> f64 {
    0.05
}

fn default_bid_ratio() -> f64 {
    0.9
}

fn default_step() -> u64 {
    10_000_000
}
