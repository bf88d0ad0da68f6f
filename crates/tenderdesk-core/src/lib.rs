//! TenderDesk Core
//!
//! Core types, traits, and utilities shared across TenderDesk components.
//!
//! This crate provides:
//! - Tender, prediction, and filter-option records exchanged with the backend
//! - The outbound search request shape
//! - Error types and user-facing error messages
//! - The explicit session context created at login
//! - The `TenderApi` trait implemented by the remote backend client

pub mod amount;
pub mod api;
pub mod error;
pub mod session;
pub mod types;

pub use amount::parse_amount;
pub use api::{BulkBid, BulkPredictionRequest, TenderApi};
pub use error::{Error, Result};
pub use session::{SessionContext, SessionState};
pub use types::{
    Confidence, FilterOptions, PredictionRecord, Rank, SearchRequest, TenderSummary,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::api::{BulkBid, BulkPredictionRequest, TenderApi};
    pub use crate::error::{Error, Result};
    pub use crate::session::SessionContext;
    pub use crate::types::{
        Confidence, FilterOptions, PredictionRecord, Rank, SearchRequest, TenderSummary,
    };
}
