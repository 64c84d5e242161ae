//! WebSocket push of collection snapshots.

mod handler;

pub use handler::{snapshot_push, ws_handler, SnapshotPush};
