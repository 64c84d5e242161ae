//! Handlers for the area collection.
//!
//! Areas carry no ownership: any signed-in user may update or delete any
//! area, and the last write wins at the record level.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use postmap_core::error::CoreError;
use postmap_events::{ChangeEvent, ChangeKind};
use postmap_store::areas::{AreaStore, CreateArea, UpdateArea};
use postmap_store::AREAS_COLLECTION;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /areas
///
/// List every area, unreadable geometry included (as the invalid
/// sentinel the client skips).
pub async fn list_areas(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let areas = AreaStore::list(state.store.as_ref()).await?;
    Ok(Json(DataResponse { data: areas }))
}

/// GET /areas/{id}
pub async fn get_area(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let area = AreaStore::find(state.store.as_ref(), &id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "area",
                id: id.clone(),
            })
        })?;
    Ok(Json(DataResponse { data: area }))
}

/// POST /areas
pub async fn create_area(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateArea>,
) -> AppResult<impl IntoResponse> {
    let area = AreaStore::create(state.store.as_ref(), input, auth.user_ref()).await?;

    tracing::info!(uid = %auth.uid, area_id = %area.id, "Area created");
    state.bus.publish(ChangeEvent::new(
        AREAS_COLLECTION,
        ChangeKind::Created,
        vec![area.id.clone()],
    ));

    Ok((StatusCode::CREATED, Json(DataResponse { data: area })))
}

/// PUT /areas/{id}
///
/// Merge-writes only the provided fields; everything omitted keeps its
/// stored value even when another device edited it concurrently.
pub async fn update_area(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateArea>,
) -> AppResult<impl IntoResponse> {
    let area = AreaStore::update(state.store.as_ref(), &id, input, auth.user_ref())
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "area",
                id: id.clone(),
            })
        })?;

    state.bus.publish(ChangeEvent::new(
        AREAS_COLLECTION,
        ChangeKind::Updated,
        vec![id],
    ));

    Ok(Json(DataResponse { data: area }))
}

/// DELETE /areas/{id}
pub async fn delete_area(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let existed = AreaStore::delete(state.store.as_ref(), &id).await?;
    if !existed {
        return Err(AppError::Core(CoreError::NotFound { entity: "area", id }));
    }

    tracing::info!(uid = %auth.uid, area_id = %id, "Area deleted");
    state.bus.publish(ChangeEvent::new(
        AREAS_COLLECTION,
        ChangeKind::Deleted,
        vec![id],
    ));

    Ok(StatusCode::NO_CONTENT)
}
