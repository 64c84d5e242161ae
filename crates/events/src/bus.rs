//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish/subscribe hub for [`ChangeEvent`]s. It is
//! designed to be shared via `Arc<EventBus>` across the application.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// ChangeEvent
// ---------------------------------------------------------------------------

/// What happened to the affected documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
    /// A bulk operation rewrote the collection wholesale (restore,
    /// purge, CSV import). Subscribers should refetch everything.
    Replaced,
}

/// A change notification for one collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Collection the change landed in, e.g. `"posting_areas"`.
    pub collection: String,

    pub kind: ChangeKind,

    /// Ids of the affected documents. Empty for [`ChangeKind::Replaced`].
    pub ids: Vec<String>,

    /// When the change was published (UTC).
    pub timestamp: DateTime<Utc>,
}

impl ChangeEvent {
    pub fn new(collection: impl Into<String>, kind: ChangeKind, ids: Vec<String>) -> Self {
        Self {
            collection: collection.into(),
            kind,
            ids,
            timestamp: Utc::now(),
        }
    }

    /// A whole-collection rewrite event.
    pub fn replaced(collection: impl Into<String>) -> Self {
        Self::new(collection, ChangeKind::Replaced, Vec::new())
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`ChangeEvent`].
pub struct EventBus {
    sender: broadcast::Sender<ChangeEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped.
    pub fn publish(&self, event: ChangeEvent) {
        // A SendError only means there are zero receivers right now.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
