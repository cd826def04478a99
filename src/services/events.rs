//! Change notification bus for catalog writes.
//!
//! An in-process fan-out over a `tokio::sync::broadcast` channel. Every
//! receiver alive at publish time gets the event; nothing is replayed to later
//! subscribers. Dropping a receiver unsubscribes it.

use tokio::sync::broadcast;

use crate::db::{AuthorRecord, BookRecord};

/// Default number of events a slow subscriber may fall behind before it
/// starts missing events.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Catalog change notification. Each topic carries the full entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogEvent {
    AuthorAdded(AuthorRecord),
    AuthorEdited(AuthorRecord),
    BookAdded(BookRecord),
}

impl CatalogEvent {
    /// Topic name, used for logging
    pub fn topic(&self) -> &'static str {
        match self {
            CatalogEvent::AuthorAdded(_) => "AUTHOR_ADDED",
            CatalogEvent::AuthorEdited(_) => "AUTHOR_EDITED",
            CatalogEvent::BookAdded(_) => "BOOK_ADDED",
        }
    }
}

/// Publish/subscribe handle. Clones share the same channel.
#[derive(Clone)]
pub struct CatalogEvents {
    sender: broadcast::Sender<CatalogEvent>,
}

impl CatalogEvents {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Register a new listener; it sees events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<CatalogEvent> {
        self.sender.subscribe()
    }

    /// Deliver an event to all current listeners. Returns how many received it;
    /// zero listeners is not an error.
    pub fn publish(&self, event: CatalogEvent) -> usize {
        let topic = event.topic();
        match self.sender.send(event) {
            Ok(receivers) => {
                tracing::debug!(topic, receivers, "Published catalog event");
                receivers
            }
            Err(_) => {
                tracing::debug!(topic, "No subscribers for catalog event");
                0
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for CatalogEvents {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}
