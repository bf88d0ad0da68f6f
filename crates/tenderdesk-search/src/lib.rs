//! TenderDesk Search
//!
//! Stateful search plumbing for the tender list:
//!
//! - [`FilterController`] keeps the region / sub-region pair consistent
//! - [`SearchScheduler`] debounces filter edits into single, generation-tagged
//!   backend calls and drops stale responses
//! - [`EventBus`] broadcasts accepted result sets to subscribers
//! - [`SearchPanel`] wires the three together for one search view

pub mod event_bus;
pub mod filter;
pub mod panel;
pub mod scheduler;

pub use event_bus::{EventBus, SearchEvent};
pub use filter::{FilterController, FilterField, FilterState, FilterValue};
pub use panel::SearchPanel;
pub use scheduler::{SchedulerConfig, SearchPhase, SearchScheduler, SearchView};
