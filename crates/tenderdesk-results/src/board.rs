//! Prediction board: single and bulk prediction flows
//!
//! The board owns the current prediction list and its page window. A bulk
//! run replaces the list wholesale; a failed run clears it. Inputs are
//! validated before anything is sent to the backend.

use crate::export::{export_to_file, ExportFormat};
use crate::paginate::PageWindow;
use crate::summary::{summarize, AggregateSummary};
use metrics::counter;
use std::path::Path;
use std::sync::Arc;
use tenderdesk_core::{
    BulkBid, BulkPredictionRequest, Error, PredictionRecord, Result, SearchRequest, TenderApi,
};
use tracing::{info, warn};

const BULK_FAILED_MESSAGE: &str = "一括予測に失敗しました";
const MISSING_INPUT_MESSAGE: &str = "案件と入札額を入力してください";
const MISSING_BID_MESSAGE: &str = "入札額を入力してください";

/// Bulk prediction limits and defaults
#[derive(Debug, Clone, PartialEq)]
pub struct BulkSettings {
    /// Ratio preselected in the bid field (% of estimated price)
    pub default_ratio_percent: u32,
    pub min_ratio_percent: u32,
    pub max_ratio_percent: u32,
    /// Only tenders whose bid lands in this range are predicted
    pub price_range: Option<(u64, u64)>,
    pub page_size: usize,
}

impl Default for BulkSettings {
    fn default() -> Self {
        Self {
            default_ratio_percent: 90,
            min_ratio_percent: 70,
            max_ratio_percent: 100,
            price_range: Some((100_000_000, 2_000_000_000)),
            page_size: 10,
        }
    }
}

/// Holds prediction results for presentation
pub struct PredictionBoard {
    api: Arc<dyn TenderApi>,
    settings: BulkSettings,
    records: Vec<PredictionRecord>,
    page: PageWindow,
    error: Option<String>,
    last_single: Option<PredictionRecord>,
}

impl PredictionBoard {
    pub fn new(api: Arc<dyn TenderApi>, settings: BulkSettings) -> Self {
        let page = PageWindow::new(settings.page_size);
        Self {
            api,
            settings,
            records: Vec::new(),
            page,
            error: None,
            last_single: None,
        }
    }

    pub fn settings(&self) -> &BulkSettings {
        &self.settings
    }

    pub fn records(&self) -> &[PredictionRecord] {
        &self.records
    }

    /// Records on the current page
    pub fn page_records(&self) -> &[PredictionRecord] {
        self.page.slice(&self.records)
    }

    pub fn page(&self) -> PageWindow {
        self.page
    }

    pub fn set_page(&mut self, page_index: usize) {
        self.page.set_page(page_index);
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.page.set_page_size(page_size);
    }

    /// User-visible message of the last failure
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn last_single(&self) -> Option<&PredictionRecord> {
        self.last_single.as_ref()
    }

    pub fn summary(&self) -> AggregateSummary {
        summarize(&self.records)
    }

    /// Default bid for the bulk form
    pub fn default_bid(&self) -> BulkBid {
        BulkBid::Ratio(self.settings.default_ratio_percent)
    }

    /// Check a bulk bid against the configured limits
    pub fn validate_bid(&self, bid: &BulkBid) -> Result<()> {
        match *bid {
            BulkBid::Ratio(percent) => {
                let (min, max) = (self.settings.min_ratio_percent, self.settings.max_ratio_percent);
                if percent < min || percent > max {
                    return Err(Error::validation(format!(
                        "予定価格比率は{}%〜{}%の範囲で指定してください",
                        min, max
                    )));
                }
            }
            BulkBid::Amount(0) => return Err(Error::validation(MISSING_BID_MESSAGE)),
            BulkBid::Amount(_) => {}
        }
        Ok(())
    }

    /// Predict every tender matching `filters`
    ///
    /// Only the region, sub-region and use-type filters are forwarded.
    pub async fn run_bulk(
        &mut self,
        filters: &SearchRequest,
        bid: BulkBid,
        company_name: &str,
    ) -> Result<&[PredictionRecord]> {
        if let Err(err) = self.validate_bid(&bid) {
            self.error = Some(err.user_message().to_string());
            return Err(err);
        }

        let request = BulkPredictionRequest {
            filters: SearchRequest {
                prefecture: filters.prefecture.clone(),
                municipality: filters.municipality.clone(),
                use_type: filters.use_type.clone(),
                ..Default::default()
            },
            bid,
            company_name: company_name.to_string(),
            price_range: self.settings.price_range,
        };

        self.error = None;
        match self.api.predict_bulk(&request).await {
            Ok(records) => {
                counter!("tenderdesk_bulk_predictions_total").increment(1);
                info!(count = records.len(), ?bid, "bulk prediction completed");
                self.records = records;
                self.page.reset();
                Ok(&self.records)
            }
            Err(err) => {
                warn!(error = %err, "bulk prediction failed");
                self.records.clear();
                self.page.reset();
                self.error = Some(if err.is_unauthorized() {
                    err.user_message().to_string()
                } else {
                    BULK_FAILED_MESSAGE.to_string()
                });
                Err(err)
            }
        }
    }

    /// Predict one bid on one tender
    pub async fn predict_single(
        &mut self,
        tender_id: &str,
        bid_amount: Option<u64>,
        company_name: &str,
    ) -> Result<PredictionRecord> {
        let bid_amount = match bid_amount {
            Some(amount) if amount > 0 && !tender_id.trim().is_empty() => amount,
            _ => {
                self.error = Some(MISSING_INPUT_MESSAGE.to_string());
                return Err(Error::validation(MISSING_INPUT_MESSAGE));
            }
        };

        self.error = None;
        match self
            .api
            .predict_single(tender_id, bid_amount, company_name)
            .await
        {
            Ok(record) => {
                info!(tender_id, bid_amount, rank = %record.rank, "prediction completed");
                self.last_single = Some(record.clone());
                Ok(record)
            }
            Err(err) => {
                warn!(tender_id, error = %err, "prediction failed");
                self.last_single = None;
                let message = if err.is_unauthorized() {
                    err.user_message().to_string()
                } else {
                    Error::prediction(err.to_string()).user_message().to_string()
                };
                self.error = Some(message);
                Err(err)
            }
        }
    }

    /// Export the full list, not just the current page
    pub fn export(&self, output_path: &Path, format: ExportFormat) -> Result<usize> {
        export_to_file(&self.records, output_path, format)
    }
}
