//! TenderDesk Classifiers
//!
//! Synchronous decision support for the bid-amount field.
//!
//! A candidate bid is classified against the tender's floor (minimum
//! acceptable price) and ceiling (estimated price):
//! - Disqualifying / CautionLow around the floor
//! - OverCeiling / CautionHigh around the ceiling
//! - Nominal otherwise
//!
//! Everything here is a pure function of its inputs and cheap enough to run
//! on every keystroke.

pub mod classifier;
pub mod config;
pub mod format;
pub mod price;

pub use classifier::{PriceAssessment, PriceCategory, Severity};
pub use config::ThresholdConfig;
pub use format::{format_grouped, format_large_unit};
pub use price::{suggested_bid, PriceClassifier, PriceStepper};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classifier::{PriceAssessment, PriceCategory, Severity};
    pub use crate::config::ThresholdConfig;
    pub use crate::price::{PriceClassifier, PriceStepper};
}
