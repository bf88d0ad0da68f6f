//! Remote backend collaborator

use crate::types::{FilterOptions, PredictionRecord, SearchRequest, TenderSummary};
use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Trait for the remote tender/prediction backend
///
/// Transport, encoding and timeouts are the implementation's concern. Every
/// failure, including a timeout, comes back as an `Err`.
#[async_trait]
pub trait TenderApi: Send + Sync {
    /// Search tender listings
    async fn search_tenders(&self, request: &SearchRequest) -> Result<Vec<TenderSummary>>;

    /// Load the advisory filter-option domains
    async fn filter_options(&self) -> Result<FilterOptions>;

    /// Predict the outcome of one bid on one tender
    async fn predict_single(
        &self,
        tender_id: &str,
        bid_amount: u64,
        company_name: &str,
    ) -> Result<PredictionRecord>;

    /// Predict outcomes for every tender matching the request's filters
    async fn predict_bulk(&self, request: &BulkPredictionRequest) -> Result<Vec<PredictionRecord>>;
}

/// How the bid is expressed in a bulk prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkBid {
    /// Percentage of each tender's estimated price
    Ratio(u32),
    /// The same absolute amount (yen) for every tender
    Amount(u64),
}

impl BulkBid {
    /// Value sent as `bid_amount`
    pub fn value(&self) -> u64 {
        match self {
            Self::Ratio(percent) => u64::from(*percent),
            Self::Amount(amount) => *amount,
        }
    }

    /// Whether `bid_amount` is a ratio
    pub fn is_ratio(&self) -> bool {
        matches!(self, Self::Ratio(_))
    }
}

/// Bulk prediction parameters
#[derive(Debug, Clone, PartialEq)]
pub struct BulkPredictionRequest {
    /// Tender filters; `Any` fields already stripped
    pub filters: SearchRequest,

    pub bid: BulkBid,

    pub company_name: String,

    /// Only tenders whose resulting bid falls in `[min, max]`
    pub price_range: Option<(u64, u64)>,
}
