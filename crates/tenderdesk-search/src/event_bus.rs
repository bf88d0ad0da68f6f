use std::sync::Arc;
use tenderdesk_core::TenderSummary;
use tokio::sync::broadcast;

/// Scheduler lifecycle events
#[derive(Debug, Clone)]
pub enum SearchEvent {
    /// A search call was issued
    Dispatched { generation: u64 },
    /// A response was accepted and replaced the record list
    Applied {
        generation: u64,
        records: Arc<Vec<TenderSummary>>,
    },
    /// A response arrived after a newer mutation and was dropped
    Discarded { generation: u64, latest: u64 },
    /// The latest search failed
    Failed { generation: u64, message: String },
    /// Filter options could not be loaded; searching continues
    OptionsUnavailable { message: String },
    TornDown,
}

/// Event bus for broadcasting search events to subscribers
pub struct EventBus {
    sender: broadcast::Sender<SearchEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> broadcast::Receiver<SearchEvent> {
        self.sender.subscribe()
    }

    /// Publish an event to all subscribers
    pub fn publish(&self, event: SearchEvent) {
        // Ignore send errors (no subscribers)
        let _ = self.sender.send(event);
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
