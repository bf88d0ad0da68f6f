//! TenderDesk Results
//!
//! Everything that happens to predictions after the backend returns them:
//!
//! - **Summary**: totals, recommended count, mean win probability, rank counts
//! - **Pagination**: fixed-size page windows over the record list
//! - **Export**: CSV rows with a stable Japanese header, or JSON
//! - **Board**: the single and bulk prediction flows with input validation

pub mod board;
pub mod export;
pub mod paginate;
pub mod summary;

pub use board::{BulkSettings, PredictionBoard};
pub use export::{
    export_file_name, export_to_file, to_csv, to_export_rows, to_json, ExportFormat, ExportRow,
    EXPORT_HEADER,
};
pub use paginate::{paginate, PageWindow};
pub use summary::{summarize, AggregateSummary};
