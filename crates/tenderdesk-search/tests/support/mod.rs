//! Mock tender backend for testing
//!
//! Provides a configurable `TenderApi` implementation with per-region
//! latency, failure switches and request recording.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tenderdesk_core::{
    BulkPredictionRequest, Error, FilterOptions, PredictionRecord, Result, SearchRequest,
    TenderApi, TenderSummary,
};

/// A configurable mock backend
pub struct MockTenderApi {
    latency: Option<Duration>,
    region_latency: HashMap<String, Duration>,
    fail_search: bool,
    failing_regions: HashSet<String>,
    fail_options: bool,
    options: FilterOptions,
    requests: Mutex<Vec<SearchRequest>>,
    call_count: AtomicU32,
    completed_count: AtomicU32,
}

impl MockTenderApi {
    pub fn new() -> Self {
        Self {
            latency: None,
            region_latency: HashMap::new(),
            fail_search: false,
            failing_regions: HashSet::new(),
            fail_options: false,
            options: FilterOptions::default(),
            requests: Mutex::new(Vec::new()),
            call_count: AtomicU32::new(0),
            completed_count: AtomicU32::new(0),
        }
    }

    /// Latency applied to every search
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Latency for searches filtered to one region
    pub fn with_region_latency(mut self, region: &str, latency: Duration) -> Self {
        self.region_latency.insert(region.to_string(), latency);
        self
    }

    pub fn with_options(mut self, options: FilterOptions) -> Self {
        self.options = options;
        self
    }

    pub fn failing_search(mut self) -> Self {
        self.fail_search = true;
        self
    }

    /// Fail only searches filtered to one region
    pub fn failing_region(mut self, region: &str) -> Self {
        self.failing_regions.insert(region.to_string());
        self
    }

    pub fn failing_options(mut self) -> Self {
        self.fail_options = true;
        self
    }

    /// Number of searches started
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Number of searches that ran to completion
    pub fn completed_count(&self) -> u32 {
        self.completed_count.load(Ordering::Relaxed)
    }

    pub fn requests(&self) -> Vec<SearchRequest> {
        self.requests.lock().clone()
    }
}

impl Default for MockTenderApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TenderApi for MockTenderApi {
    async fn search_tenders(&self, request: &SearchRequest) -> Result<Vec<TenderSummary>> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        self.requests.lock().push(request.clone());

        let region = request.prefecture.clone().unwrap_or_default();
        let latency = self.region_latency.get(&region).copied().or(self.latency);
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        self.completed_count.fetch_add(1, Ordering::Relaxed);

        if self.fail_search {
            return Err(Error::Remote {
                status: 500,
                detail: "internal server error".to_string(),
            });
        }
        if self.failing_regions.contains(&region) {
            return Err(Error::Timeout);
        }

        // Echo the region so tests can tell which request was applied
        let mut tender = TenderSummary::new(format!("T-{}", region), "Tender");
        tender.prefecture = region;
        Ok(vec![tender])
    }

    async fn filter_options(&self) -> Result<FilterOptions> {
        if self.fail_options {
            return Err(Error::transport("connection refused"));
        }
        Ok(self.options.clone())
    }

    async fn predict_single(
        &self,
        tender_id: &str,
        _bid_amount: u64,
        _company_name: &str,
    ) -> Result<PredictionRecord> {
        Ok(PredictionRecord::new(tender_id, "C", 0.5))
    }

    async fn predict_bulk(&self, _request: &BulkPredictionRequest) -> Result<Vec<PredictionRecord>> {
        Ok(Vec::new())
    }
}
