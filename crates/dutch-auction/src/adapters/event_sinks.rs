//! Event Sink Adapters
//!
//! Implementations of `AuctionEventSink`: an append-only log, a tokio
//! broadcast channel and a tracing-only sink.

use crate::events::AuctionEvent;
use crate::ports::outbound::AuctionEventSink;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::{debug, info};

/// Default broadcast channel capacity.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Records every event in order.
#[derive(Debug, Default)]
pub struct InMemoryEventLog {
    events: RwLock<Vec<AuctionEvent>>,
}

impl InMemoryEventLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all events so far.
    pub fn events(&self) -> Vec<AuctionEvent> {
        self.events.read().clone()
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// True if nothing was emitted.
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Count of events with the given name.
    pub fn count(&self, name: &str) -> usize {
        self.events
            .read()
            .iter()
            .filter(|e| e.name() == name)
            .count()
    }

    /// Most recent event.
    pub fn last(&self) -> Option<AuctionEvent> {
        self.events.read().last().cloned()
    }
}

impl AuctionEventSink for InMemoryEventLog {
    fn emit(&self, event: AuctionEvent) {
        self.events.write().push(event);
    }
}

/// Fans events out over `tokio::sync::broadcast`.
///
/// Events emitted with no subscribers are dropped.
pub struct BroadcastEventSink {
    sender: broadcast::Sender<AuctionEvent>,
    events_published: AtomicU64,
}

impl BroadcastEventSink {
    /// Create a sink with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a sink with `capacity` buffered events per subscriber.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            events_published: AtomicU64::new(0),
        }
    }

    /// New receiver for events emitted from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AuctionEvent> {
        self.sender.subscribe()
    }

    /// Active receivers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Total events emitted, delivered or not.
    pub fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}

impl Default for BroadcastEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl AuctionEventSink for BroadcastEventSink {
    fn emit(&self, event: AuctionEvent) {
        self.events_published.fetch_add(1, Ordering::Relaxed);
        let name = event.name();
        match self.sender.send(event) {
            Ok(receivers) => debug!(event = name, receivers, "[auction] Event published"),
            Err(_) => debug!(event = name, "[auction] Event dropped (no receivers)"),
        }
    }
}

/// Writes events to the log and nothing else.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventSink;

impl AuctionEventSink for TracingEventSink {
    fn emit(&self, event: AuctionEvent) {
        info!(
            event = event.name(),
            auction = %event.auction_id().short(),
            "[auction] {:?}",
            event
        );
    }
}
