//! Debounced, generation-tagged search scheduling
//!
//! Every filter change bumps a monotonically increasing generation and
//! re-arms a single debounce timer. When the timer fires, the most recently
//! recorded filter state is sent to the backend tagged with the generation
//! current at that moment. A response is applied only if no change happened
//! since its dispatch; anything older is dropped without surfacing an error.
//!
//! State machine:
//!
//! ```text
//! Idle --notify_change--> Pending --timer--> InFlight --response--> Idle
//!            ^                |                  |
//!            +--notify_change-+   notify_change -+-> Pending (call keeps running)
//! ```
//!
//! The shared state lives behind a `parking_lot::Mutex` that is never held
//! across an `.await`.

use crate::event_bus::{EventBus, SearchEvent};
use crate::filter::FilterState;
use metrics::counter;
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tenderdesk_core::{Error, SearchRequest, TenderApi, TenderSummary};
use tenderdesk_results::PageWindow;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Scheduler settings
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Quiet period after the last change before a search is sent
    pub debounce: Duration,

    /// Rows per page of the result list
    pub page_size: usize,

    /// Buffered events per subscriber
    pub event_capacity: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(500),
            page_size: 12,
            event_capacity: 256,
        }
    }
}

/// Where the scheduler is in its cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    Idle,
    /// A debounce timer is armed
    Pending,
    /// The latest dispatch has not answered yet
    InFlight,
    TornDown,
}

/// Presentation snapshot of the search view
#[derive(Debug, Clone)]
pub struct SearchView {
    pub records: Arc<Vec<TenderSummary>>,
    pub error: Option<String>,
    pub loading: bool,
    pub generation: u64,
    pub phase: SearchPhase,
    pub page: PageWindow,
}

impl SearchView {
    /// Records on the current page
    pub fn page_records(&self) -> &[TenderSummary] {
        self.page.slice(&self.records)
    }
}

/// Coalesces filter edits into tender searches
///
/// Cheap to clone; clones share the same state. Must be used from within a
/// tokio runtime since the debounce timer is a spawned task. The timer only
/// holds a weak reference, so dropping the last clone cancels a pending
/// search; a call already in flight still runs to completion.
#[derive(Clone)]
pub struct SearchScheduler {
    shared: Arc<Shared>,
}

struct Shared {
    api: Arc<dyn TenderApi>,
    config: SchedulerConfig,
    events: EventBus,
    inner: Mutex<Inner>,
}

struct Inner {
    generation: u64,
    recorded: SearchRequest,
    timer: Option<PendingTimer>,
    loading: bool,
    records: Arc<Vec<TenderSummary>>,
    error: Option<String>,
    page: PageWindow,
    torn_down: bool,
}

struct PendingTimer {
    /// Generation the timer was armed for
    generation: u64,
    handle: JoinHandle<()>,
}

impl Inner {
    fn phase(&self) -> SearchPhase {
        if self.torn_down {
            SearchPhase::TornDown
        } else if self.timer.is_some() {
            SearchPhase::Pending
        } else if self.loading {
            SearchPhase::InFlight
        } else {
            SearchPhase::Idle
        }
    }
}

impl SearchScheduler {
    pub fn new(api: Arc<dyn TenderApi>, config: SchedulerConfig) -> Self {
        let events = EventBus::new(config.event_capacity);
        let page = PageWindow::new(config.page_size);
        Self {
            shared: Arc::new(Shared {
                api,
                config,
                events,
                inner: Mutex::new(Inner {
                    generation: 0,
                    recorded: SearchRequest::default(),
                    timer: None,
                    loading: false,
                    records: Arc::new(Vec::new()),
                    error: None,
                    page,
                    torn_down: false,
                }),
            }),
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.shared.config
    }

    /// Subscribe to scheduler events
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<SearchEvent> {
        self.shared.events.subscribe()
    }

    pub(crate) fn events(&self) -> &EventBus {
        &self.shared.events
    }

    /// Latest generation
    pub fn generation(&self) -> u64 {
        self.shared.inner.lock().generation
    }

    pub fn phase(&self) -> SearchPhase {
        self.shared.inner.lock().phase()
    }

    pub fn is_torn_down(&self) -> bool {
        self.shared.inner.lock().torn_down
    }

    /// Current presentation state
    pub fn snapshot(&self) -> SearchView {
        let inner = self.shared.inner.lock();
        SearchView {
            records: Arc::clone(&inner.records),
            error: inner.error.clone(),
            loading: inner.loading,
            generation: inner.generation,
            phase: inner.phase(),
            page: inner.page,
        }
    }

    /// Record a filter change and restart the debounce timer
    ///
    /// A search already in flight keeps running; its response will be
    /// discarded as stale.
    pub fn notify_change(&self, state: &FilterState) {
        let mut inner = self.shared.inner.lock();
        if inner.torn_down {
            debug!("ignoring filter change after teardown");
            return;
        }

        inner.generation += 1;
        inner.recorded = state.to_request();
        let generation = inner.generation;

        if let Some(previous) = inner.timer.take() {
            previous.handle.abort();
        }

        // The timer must not keep the scheduler alive once every handle is gone
        let shared: Weak<Shared> = Arc::downgrade(&self.shared);
        let delay = self.shared.config.debounce;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            match shared.upgrade() {
                Some(shared) => shared.on_timer_fire(generation).await,
                None => debug!(generation, "scheduler dropped before debounce fired"),
            }
        });
        inner.timer = Some(PendingTimer { generation, handle });

        debug!(generation, delay_ms = delay.as_millis() as u64, "search debounce armed");
    }

    /// Cancel any pending timer and search the recorded state immediately
    pub async fn force_search_now(&self) {
        let (request, generation) = {
            let mut inner = self.shared.inner.lock();
            if inner.torn_down {
                return;
            }
            if let Some(timer) = inner.timer.take() {
                timer.handle.abort();
            }
            inner.generation += 1;
            inner.page.reset();
            inner.loading = true;
            inner.error = None;
            (inner.recorded.clone(), inner.generation)
        };

        info!(generation, "forcing immediate search");
        self.shared.dispatch(request, generation).await;
    }

    /// Record `state` and search it immediately, bypassing the debounce
    pub async fn search_now(&self, state: &FilterState) {
        self.shared.inner.lock().recorded = state.to_request();
        self.force_search_now().await;
    }

    pub fn set_page(&self, page_index: usize) {
        self.shared.inner.lock().page.set_page(page_index);
    }

    pub fn set_page_size(&self, page_size: usize) {
        self.shared.inner.lock().page.set_page_size(page_size);
    }

    /// Cancel the pending timer; responses that arrive later are discarded
    pub fn teardown(&self) {
        {
            let mut inner = self.shared.inner.lock();
            if inner.torn_down {
                return;
            }
            inner.torn_down = true;
            inner.loading = false;
            if let Some(timer) = inner.timer.take() {
                timer.handle.abort();
            }
        }

        info!("search scheduler torn down");
        self.shared.events.publish(SearchEvent::TornDown);
    }
}

impl Shared {
    async fn on_timer_fire(&self, armed_generation: u64) {
        let (request, generation) = {
            let mut inner = self.inner.lock();
            match &inner.timer {
                Some(timer) if timer.generation == armed_generation => {}
                _ => {
                    debug!(armed_generation, "superseded debounce timer fired");
                    return;
                }
            }
            // Detach from the timer slot so a later change cannot abort the
            // call that is about to start.
            inner.timer = None;
            if inner.torn_down {
                return;
            }
            inner.page.reset();
            inner.loading = true;
            inner.error = None;
            (inner.recorded.clone(), inner.generation)
        };

        self.dispatch(request, generation).await;
    }

    async fn dispatch(&self, request: SearchRequest, generation: u64) {
        counter!("tenderdesk_search_dispatched_total").increment(1);
        debug!(generation, ?request, "dispatching tender search");
        self.events.publish(SearchEvent::Dispatched { generation });

        let result = self.api.search_tenders(&request).await;

        let mut inner = self.inner.lock();
        if inner.torn_down || generation != inner.generation {
            let latest = inner.generation;
            drop(inner);

            counter!("tenderdesk_search_discarded_total").increment(1);
            debug!(generation, latest, ok = result.is_ok(), "discarding stale search response");
            self.events.publish(SearchEvent::Discarded { generation, latest });
            return;
        }

        inner.loading = false;
        match result {
            Ok(records) => {
                let records = Arc::new(records);
                inner.records = Arc::clone(&records);
                inner.error = None;
                inner.page.reset();
                drop(inner);

                info!(generation, count = records.len(), "search results applied");
                self.events.publish(SearchEvent::Applied { generation, records });
            }
            Err(err) => {
                let message = if err.is_unauthorized() {
                    err.user_message().to_string()
                } else {
                    Error::search(err.to_string()).user_message().to_string()
                };
                inner.records = Arc::new(Vec::new());
                inner.error = Some(message.clone());
                drop(inner);

                counter!("tenderdesk_search_failed_total").increment(1);
                warn!(generation, error = %err, "tender search failed");
                self.events.publish(SearchEvent::Failed { generation, message });
            }
        }
    }
}
