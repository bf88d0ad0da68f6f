//! Search panel: one filter controller driving one scheduler

use crate::event_bus::SearchEvent;
use crate::filter::{FilterController, FilterField, FilterState, FilterValue};
use crate::scheduler::{SchedulerConfig, SearchScheduler, SearchView};
use std::sync::Arc;
use tenderdesk_core::{Error, TenderApi};
use tracing::{info, warn};

/// A mounted tender search view
///
/// Filter edits go through the [`FilterController`] and are then handed to
/// the [`SearchScheduler`]. Dropping the panel tears the scheduler down.
pub struct SearchPanel {
    api: Arc<dyn TenderApi>,
    filters: FilterController,
    scheduler: SearchScheduler,
    options_error: Option<String>,
}

impl SearchPanel {
    pub fn new(api: Arc<dyn TenderApi>, config: SchedulerConfig) -> Self {
        let scheduler = SearchScheduler::new(Arc::clone(&api), config);
        Self {
            api,
            filters: FilterController::new(),
            scheduler,
            options_error: None,
        }
    }

    /// Load filter options once, then run the initial search
    ///
    /// An option-loading failure is surfaced through [`Self::options_error`]
    /// but does not block searching.
    pub async fn mount(&mut self) {
        self.load_options().await;
        self.scheduler.search_now(self.filters.state()).await;
    }

    /// Fetch the advisory filter options; returns whether they loaded
    pub async fn load_options(&mut self) -> bool {
        match self.api.filter_options().await {
            Ok(options) => {
                info!(
                    prefectures = options.prefectures.len(),
                    municipalities = options.municipalities.len(),
                    "filter options loaded"
                );
                self.filters.set_options(options);
                self.options_error = None;
                true
            }
            Err(err) => {
                warn!(error = %err, "failed to load filter options, continuing without them");
                let message = if err.is_unauthorized() {
                    err.user_message().to_string()
                } else {
                    Error::options(err.to_string()).user_message().to_string()
                };
                self.scheduler.events().publish(SearchEvent::OptionsUnavailable {
                    message: message.clone(),
                });
                self.options_error = Some(message);
                false
            }
        }
    }

    /// Edit one filter and schedule a debounced search
    pub fn set_field(&mut self, field: FilterField, value: FilterValue) -> &FilterState {
        self.filters.set_field(field, value);
        self.scheduler.notify_change(self.filters.state());
        self.filters.state()
    }

    /// Clear every filter and schedule a debounced search
    pub fn reset(&mut self) -> &FilterState {
        self.filters.reset();
        self.scheduler.notify_change(self.filters.state());
        self.filters.state()
    }

    /// Search the current filters immediately
    pub async fn search_now(&self) {
        self.scheduler.search_now(self.filters.state()).await;
    }

    pub fn set_page(&self, page_index: usize) {
        self.scheduler.set_page(page_index);
    }

    pub fn set_page_size(&self, page_size: usize) {
        self.scheduler.set_page_size(page_size);
    }

    pub fn filters(&self) -> &FilterController {
        &self.filters
    }

    pub fn scheduler(&self) -> &SearchScheduler {
        &self.scheduler
    }

    pub fn options_error(&self) -> Option<&str> {
        self.options_error.as_deref()
    }

    pub fn view(&self) -> SearchView {
        self.scheduler.snapshot()
    }

    pub fn teardown(&self) {
        self.scheduler.teardown();
    }
}

impl Drop for SearchPanel {
    fn drop(&mut self) {
        self.scheduler.teardown();
    }
}
