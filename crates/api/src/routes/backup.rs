//! Route definitions for backup and the admin danger zone.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::backup;
use crate::state::AppState;

/// Backup routes mounted at `/backup`.
///
/// ```text
/// GET  /export    -> export_backup
/// POST /restore   -> restore_backup (admin only)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/export", get(backup::export_backup))
        .route("/restore", post(backup::restore_backup))
}

/// Danger-zone routes mounted at `/admin`.
///
/// ```text
/// POST /purge/areas   -> purge_areas (admin only)
/// POST /purge/spots   -> purge_spots (admin only)
/// ```
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/purge/areas", post(backup::purge_areas))
        .route("/purge/spots", post(backup::purge_spots))
}
