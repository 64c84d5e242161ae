use std::sync::Arc;

use postmap_events::EventBus;
use postmap_store::DocumentStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// The document store backing every collection. Production wires in
    /// [`postmap_store::PgStore`]; tests use [`postmap_store::MemoryStore`].
    pub store: Arc<dyn DocumentStore>,
    /// Server configuration (accessed by middleware and handlers).
    pub config: Arc<ServerConfig>,
    /// Centralized event bus for publishing change notifications.
    pub bus: Arc<EventBus>,
}
