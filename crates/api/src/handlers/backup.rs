//! Handlers for backup export, restore, and the danger-zone purges.

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::Value;

use postmap_events::ChangeEvent;
use postmap_store::backup::{backup_filename, BackupEngine};
use postmap_store::{AREAS_COLLECTION, SPOTS_COLLECTION};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /backup/export
///
/// The full area collection as a portable JSON array, served as a file
/// download named after today's date.
pub async fn export_backup(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let backup = BackupEngine::export_areas(state.store.as_ref()).await?;
    let filename = backup_filename(chrono::Utc::now().date_naive());

    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        Json(backup),
    ))
}

/// POST /backup/restore (admin only)
///
/// Replaces the entire area collection with the uploaded backup. The
/// file is validated in full before the first write; a malformed file
/// returns 400 and leaves the store untouched.
pub async fn restore_backup(
    RequireAdmin(auth): RequireAdmin,
    State(state): State<AppState>,
    Json(backup): Json<Value>,
) -> AppResult<impl IntoResponse> {
    let summary = BackupEngine::restore_areas(state.store.as_ref(), &backup).await?;

    tracing::info!(
        uid = %auth.uid,
        deleted = summary.deleted,
        restored = summary.restored,
        "Backup restored"
    );
    state.bus.publish(ChangeEvent::replaced(AREAS_COLLECTION));

    Ok(Json(DataResponse { data: summary }))
}

/// POST /admin/purge/areas (admin only)
pub async fn purge_areas(
    RequireAdmin(auth): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let deleted = BackupEngine::purge_areas(state.store.as_ref()).await?;

    tracing::warn!(uid = %auth.uid, deleted, "Area collection purged");
    state.bus.publish(ChangeEvent::replaced(AREAS_COLLECTION));

    Ok(Json(DataResponse {
        data: serde_json::json!({ "deleted": deleted }),
    }))
}

/// POST /admin/purge/spots (admin only)
///
/// Deletes every spot pointer and content document.
pub async fn purge_spots(
    RequireAdmin(auth): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let deleted = BackupEngine::purge_spots(state.store.as_ref()).await?;

    tracing::warn!(uid = %auth.uid, deleted, "Spot collections purged");
    state.bus.publish(ChangeEvent::replaced(SPOTS_COLLECTION));

    Ok(Json(DataResponse {
        data: serde_json::json!({ "deleted": deleted }),
    }))
}
