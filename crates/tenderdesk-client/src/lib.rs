//! TenderDesk Client
//!
//! Connects the dashboard core to the remote backend:
//!
//! - [`HttpTenderApi`]: `TenderApi` over HTTP with bearer-token sessions
//! - [`DashboardConfig`]: YAML configuration with defaults and validation

pub mod config;
pub mod http;

pub use config::{ApiConfig, BulkConfig, DashboardConfig, SearchConfig};
pub use http::HttpTenderApi;
