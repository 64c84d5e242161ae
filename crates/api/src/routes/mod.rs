pub mod areas;
pub mod backup;
pub mod health;
pub mod spots;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Every route below except the WebSocket upgrade requires the identity
/// headers; browsers cannot attach custom headers to an upgrade request,
/// and the socket only ever pushes.
///
/// Route hierarchy:
///
/// ```text
/// /ws                      collection snapshot push WebSocket
///
/// /areas                   list, create
/// /areas/{id}              get, update, delete
///
/// /spots                   list, create
/// /spots/categories        category and suggested-tag catalogue
/// /spots/export.csv        CSV download
/// /spots/import.csv        CSV upload
/// /spots/{id}              get, update, delete
/// /spots/{id}/content      lazy content fetch
///
/// /backup/export           full-collection JSON download
/// /backup/restore          destructive restore (admin only)
///
/// /admin/purge/areas       delete every area (admin only)
/// /admin/purge/spots       delete every spot (admin only)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // WebSocket endpoint pushing collection snapshots on change.
        .route("/ws", get(ws::ws_handler))
        // Area polygons.
        .nest("/areas", areas::router())
        // Spot pins and the CSV surface.
        .nest("/spots", spots::router())
        // Backup export / restore.
        .nest("/backup", backup::router())
        // Danger-zone bulk deletes.
        .nest("/admin", backup::admin_router())
}
