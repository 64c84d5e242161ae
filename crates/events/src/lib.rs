//! Change notification infrastructure.
//!
//! Mutations to the shared collections fan out through an in-process
//! [`EventBus`]; the websocket layer subscribes and pushes fresh
//! snapshots to connected clients, which is what keeps every device's
//! map current without polling.

pub mod bus;

pub use bus::{ChangeEvent, ChangeKind, EventBus};
