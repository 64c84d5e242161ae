//! Handlers for spot pins.
//!
//! New photos arrive base64-encoded (bare or as data URIs); they are
//! re-encoded server-side before the split write. Responses resolve the
//! legacy/split distinction so clients never see raw pointer documents.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use postmap_core::error::CoreError;
use postmap_core::photo;
use postmap_core::spot::{GeoPoint, SpotCategory, SpotContent, SpotRecord, SpotView};
use postmap_core::types::{wire_ts, SpotAuthor, Timestamp};
use postmap_events::{ChangeEvent, ChangeKind};
use postmap_store::spots::{SpotStore, SpotSubmission};
use postmap_store::SPOTS_COLLECTION;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response DTOs
// ---------------------------------------------------------------------------

/// POST /spots body.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSpotRequest {
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub lng: f64,
    #[validate(length(max = 200))]
    pub name: Option<String>,
    pub category: Option<SpotCategory>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub memo: String,
    /// Newly attached photos, base64-encoded (bare or data URI).
    #[serde(default)]
    pub photos: Vec<String>,
}

/// PUT /spots/{id} body. Location and authorship are immutable.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSpotRequest {
    #[validate(length(max = 200))]
    pub name: Option<String>,
    pub category: Option<SpotCategory>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub memo: String,
    #[serde(default)]
    pub photos: Vec<String>,
    /// Already-stored photo strings the client chose to keep.
    #[serde(default)]
    pub kept_photo_urls: Vec<String>,
}

/// A spot pointer with its legacy/split distinction resolved for display.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotResponse {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub category: SpotCategory,
    pub tags: Vec<String>,
    pub location: GeoPoint,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(with = "wire_ts")]
    pub created_at: Timestamp,
    pub created_by: SpotAuthor,
    pub legacy: bool,
    pub view: SpotView,
}

impl SpotResponse {
    fn resolve(record: &SpotRecord, content: Option<&SpotContent>) -> Self {
        let spot = record.spot();
        Self {
            id: spot.id.clone(),
            name: spot.name.clone(),
            category: spot.category,
            tags: spot.tags.clone(),
            location: spot.location,
            thumbnail_url: spot.thumbnail_url.clone(),
            created_at: spot.created_at,
            created_by: spot.created_by.clone(),
            legacy: record.is_legacy(),
            view: SpotView::resolve(record, content),
        }
    }
}

/// Decode base64 photo payloads into raw bytes for compression.
fn decode_photos(photos: &[String]) -> AppResult<Vec<Vec<u8>>> {
    photos
        .iter()
        .map(|p| photo::decode_payload(p).map_err(AppError::Core))
        .collect()
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /spots
///
/// List every spot pointer. Split records are returned with their
/// thumbnail placeholder view; clients fetch content lazily via
/// `GET /spots/{id}/content`.
pub async fn list_spots(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let records = SpotStore::list(state.store.as_ref()).await?;
    let data: Vec<SpotResponse> = records
        .iter()
        .map(|record| SpotResponse::resolve(record, None))
        .collect();
    Ok(Json(DataResponse { data }))
}

/// GET /spots/{id}
///
/// A single spot, fully resolved: for split records the content
/// document is fetched and folded into the view.
pub async fn get_spot(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let record = SpotStore::find(state.store.as_ref(), &id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "spot",
                id: id.clone(),
            })
        })?;

    let content = if record.needs_content_fetch() {
        Some(SpotStore::content(state.store.as_ref(), &id).await?)
    } else {
        None
    };

    Ok(Json(DataResponse {
        data: SpotResponse::resolve(&record, content.as_ref()),
    }))
}

/// GET /spots/{id}/content
///
/// The lazy half of the split read. Missing content resolves to an
/// empty record, never 404 (the pointer existing is what matters).
pub async fn get_spot_content(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let content = SpotStore::content(state.store.as_ref(), &id).await?;
    Ok(Json(DataResponse { data: content }))
}

/// POST /spots
pub async fn create_spot(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateSpotRequest>,
) -> AppResult<impl IntoResponse> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let location = GeoPoint {
        lat: input.lat,
        lng: input.lng,
    };
    let submission = SpotSubmission {
        name: input.name,
        category: input.category,
        tags: input.tags,
        memo: input.memo,
        new_photos: decode_photos(&input.photos)?,
        kept_photo_urls: Vec::new(),
    };

    let spot = SpotStore::create(
        state.store.as_ref(),
        submission,
        location,
        auth.spot_author(),
    )
    .await?;

    tracing::info!(uid = %auth.uid, spot_id = %spot.id, "Spot created");
    state.bus.publish(ChangeEvent::new(
        SPOTS_COLLECTION,
        ChangeKind::Created,
        vec![spot.id.clone()],
    ));

    let record = SpotRecord::Split { spot };
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: SpotResponse::resolve(&record, None),
        }),
    ))
}

/// PUT /spots/{id}
pub async fn update_spot(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateSpotRequest>,
) -> AppResult<impl IntoResponse> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let submission = SpotSubmission {
        name: input.name,
        category: input.category,
        tags: input.tags,
        memo: input.memo,
        new_photos: decode_photos(&input.photos)?,
        kept_photo_urls: input.kept_photo_urls,
    };

    SpotStore::edit(state.store.as_ref(), &id, submission).await?;

    tracing::info!(uid = %auth.uid, spot_id = %id, "Spot updated");
    state.bus.publish(ChangeEvent::new(
        SPOTS_COLLECTION,
        ChangeKind::Updated,
        vec![id.clone()],
    ));

    let record = SpotStore::find(state.store.as_ref(), &id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "spot",
                id: id.clone(),
            })
        })?;
    let content = SpotStore::content(state.store.as_ref(), &id).await?;

    Ok(Json(DataResponse {
        data: SpotResponse::resolve(&record, Some(&content)),
    }))
}

/// DELETE /spots/{id}
pub async fn delete_spot(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let existed = SpotStore::delete(state.store.as_ref(), &id).await?;
    if !existed {
        return Err(AppError::Core(CoreError::NotFound { entity: "spot", id }));
    }

    tracing::info!(uid = %auth.uid, spot_id = %id, "Spot deleted");
    state.bus.publish(ChangeEvent::new(
        SPOTS_COLLECTION,
        ChangeKind::Deleted,
        vec![id],
    ));

    Ok(StatusCode::NO_CONTENT)
}

/// GET /spots/categories
///
/// The fixed category list with each category's suggested tag set, as
/// offered by the collection UI.
pub async fn list_categories(_auth: AuthUser) -> impl IntoResponse {
    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct CategoryInfo {
        id: &'static str,
        default_tags: &'static [&'static str],
    }

    let data: Vec<CategoryInfo> = [
        SpotCategory::Prohibited,
        SpotCategory::Caution,
        SpotCategory::Info,
    ]
    .iter()
    .map(|c| CategoryInfo {
        id: c.as_str(),
        default_tags: c.default_tags(),
    })
    .collect();

    Json(DataResponse { data })
}
