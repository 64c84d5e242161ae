//! Handlers for spot CSV export and import.

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use postmap_core::csv::{self, CsvSpot, SkippedRow};
use postmap_events::ChangeEvent;
use postmap_store::spots::SpotStore;
use postmap_store::SPOTS_COLLECTION;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Result of a CSV import: how many spots were written and which rows
/// were refused.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: Vec<SkippedRow>,
}

/// GET /spots/export.csv
///
/// Every spot (content included) as a BOM-prefixed CSV download named
/// after today's date.
pub async fn export_csv(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let records = SpotStore::list(state.store.as_ref()).await?;

    let mut rows = Vec::with_capacity(records.len());
    for record in &records {
        let spot = record.spot();
        // Legacy rows resolve inline; split rows need the content fetch.
        let view = if record.needs_content_fetch() {
            let content = SpotStore::content(state.store.as_ref(), &spot.id).await?;
            postmap_core::spot::SpotView::resolve(record, Some(&content))
        } else {
            postmap_core::spot::SpotView::resolve(record, None)
        };

        rows.push(CsvSpot {
            id: spot.id.clone(),
            name: spot.name.clone().unwrap_or_default(),
            category: spot.category,
            tags: spot.tags.clone(),
            location: spot.location,
            memo: view.memo,
            photo_urls: view.photo_urls,
            created_at: spot.created_at,
            created_by: spot.created_by.clone(),
        });
    }

    let body = csv::export_spots(&rows);
    let filename = csv::export_filename(chrono::Utc::now().date_naive());

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    ))
}

/// POST /spots/import.csv
///
/// Body is the raw CSV text. Bad rows are skipped and reported; the
/// remaining rows are written as pointer/content pairs under the bulk
/// batching discipline.
pub async fn import_csv(
    auth: AuthUser,
    State(state): State<AppState>,
    body: String,
) -> AppResult<impl IntoResponse> {
    let parsed = csv::parse_spots(&body).map_err(crate::error::AppError::Core)?;
    let skipped = parsed.skipped;

    let imported = SpotStore::import(state.store.as_ref(), parsed.records).await?;

    tracing::info!(
        uid = %auth.uid,
        imported,
        skipped = skipped.len(),
        "CSV import complete"
    );
    if imported > 0 {
        state.bus.publish(ChangeEvent::replaced(SPOTS_COLLECTION));
    }

    Ok(Json(DataResponse {
        data: ImportSummary { imported, skipped },
    }))
}
