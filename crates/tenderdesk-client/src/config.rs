//! Dashboard configuration

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tenderdesk_classifiers::ThresholdConfig;
use tenderdesk_core::{Error, Result};
use tenderdesk_results::BulkSettings;
use tenderdesk_search::SchedulerConfig;
use tracing::debug;

/// Top-level configuration, usually read from `tenderdesk.yaml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub search: SearchConfig,

    /// Bid-amount thresholds
    #[serde(default)]
    pub pricing: ThresholdConfig,

    #[serde(default)]
    pub bulk: BulkConfig,
}

impl DashboardConfig {
    /// Read `path` if it exists, otherwise start from defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: Self = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            serde_yaml::from_str(&content).map_err(|e| {
                Error::config(format!("invalid {}: {}", path.display(), e))
            })?
        } else {
            debug!(path = %path.display(), "no config file, using defaults");
            Self::default()
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject values that cannot work
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(Error::config("api.base_url must not be empty"));
        }
        if self.api.timeout_secs == 0 {
            return Err(Error::config("api.timeout_secs must be positive"));
        }
        if self.search.page_size == 0 {
            return Err(Error::config("search.page_size must be positive"));
        }
        if self.bulk.page_size == 0 {
            return Err(Error::config("bulk.page_size must be positive"));
        }

        self.pricing.validate()?;

        let bulk = &self.bulk;
        if bulk.min_ratio_percent > bulk.max_ratio_percent {
            return Err(Error::config(format!(
                "bulk.min_ratio_percent ({}) exceeds bulk.max_ratio_percent ({})",
                bulk.min_ratio_percent, bulk.max_ratio_percent
            )));
        }
        if !(bulk.min_ratio_percent..=bulk.max_ratio_percent).contains(&bulk.default_ratio_percent) {
            return Err(Error::config(format!(
                "bulk.default_ratio_percent ({}) is outside {}..={}",
                bulk.default_ratio_percent, bulk.min_ratio_percent, bulk.max_ratio_percent
            )));
        }
        if let Some([low, high]) = bulk.price_range {
            if low > high {
                return Err(Error::config(format!(
                    "bulk.price_range is inverted: [{}, {}]",
                    low, high
                )));
            }
        }

        Ok(())
    }

    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            debounce: Duration::from_millis(self.search.debounce_ms),
            page_size: self.search.page_size,
            ..Default::default()
        }
    }

    pub fn bulk_settings(&self) -> BulkSettings {
        BulkSettings {
            default_ratio_percent: self.bulk.default_ratio_percent,
            min_ratio_percent: self.bulk.min_ratio_percent,
            max_ratio_percent: self.bulk.max_ratio_percent,
            price_range: self.bulk.price_range.map(|[low, high]| (low, high)),
            page_size: self.bulk.page_size,
        }
    }
}

/// Backend connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Backend base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Search view settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Debounce delay after the last filter edit
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    #[serde(default = "default_search_page_size")]
    pub page_size: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            page_size: default_search_page_size(),
        }
    }
}

/// Bulk prediction settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkConfig {
    #[serde(default = "default_ratio_percent")]
    pub default_ratio_percent: u32,

    #[serde(default = "default_min_ratio_percent")]
    pub min_ratio_percent: u32,

    #[serde(default = "default_max_ratio_percent")]
    pub max_ratio_percent: u32,

    /// `[min, max]` bid range in yen; `null` disables the range
    #[serde(default = "default_price_range")]
    pub price_range: Option<[u64; 2]>,

    #[serde(default = "default_bulk_page_size")]
    pub page_size: usize,
}

impl Default for BulkConfig {
    fn default() -> Self {
        Self {
            default_ratio_percent: default_ratio_percent(),
            min_ratio_percent: default_min_ratio_percent(),
            max_ratio_percent: default_max_ratio_percent(),
            price_range: default_price_range(),
            page_size: default_bulk_page_size(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_search_page_size() -> usize {
    12
}

fn default_ratio_percent() -> u32 {
    90
}

fn default_min_ratio_percent() -> u32 {
    70
}

fn default_max_ratio_percent() -> u32 {
    100
}

fn default_price_range() -> Option<[u64; 2]> {
    Some([100_000_000, 2_000_000_000])
}

fn default_bulk_page_size() -> usize {
    10
}
