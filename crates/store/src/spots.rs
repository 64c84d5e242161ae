//! Spot split-write protocol.
//!
//! A submission writes two documents under one id in a single batch:
//! the lightweight pointer and the heavy content record. Readers can
//! therefore never observe one without the other.

use postmap_core::csv::CsvSpot;
use postmap_core::error::CoreError;
use postmap_core::photo;
use postmap_core::spot::{
    self, GeoPoint, Spot, SpotCategory, SpotContent, SpotRecord, MAX_PHOTOS_PER_SPOT,
};
use postmap_core::types::{new_doc_id, SpotAuthor};

use crate::batch::{commit_all, partition, WriteBatch, WriteOp};
use crate::store::DocumentStore;
use crate::{SPOTS_COLLECTION, SPOT_CONTENTS_COLLECTION};

/// Fields of a spot submission shared by create and edit.
#[derive(Debug, Clone, Default)]
pub struct SpotSubmission {
    pub name: Option<String>,
    pub category: Option<SpotCategory>,
    pub tags: Vec<String>,
    pub memo: String,
    /// Raw bytes of newly attached photos.
    pub new_photos: Vec<Vec<u8>>,
    /// Already-stored photo strings the user chose to keep (edit mode).
    pub kept_photo_urls: Vec<String>,
}

/// Provides the split read/write operations for spots.
pub struct SpotStore;

impl SpotStore {
    /// List every spot pointer, each resolved to its legacy/split variant.
    pub async fn list(store: &dyn DocumentStore) -> Result<Vec<SpotRecord>, CoreError> {
        let docs = store.list(SPOTS_COLLECTION).await.map_err(CoreError::from)?;
        Ok(docs
            .iter()
            .map(|doc| SpotRecord::from_wire(&doc.data, &doc.id))
            .collect())
    }

    pub async fn find(store: &dyn DocumentStore, id: &str) -> Result<Option<SpotRecord>, CoreError> {
        let doc = store.get(SPOTS_COLLECTION, id).await.map_err(CoreError::from)?;
        Ok(doc.map(|data| SpotRecord::from_wire(&data, id)))
    }

    /// Lazy content fetch. A missing content document resolves to empty
    /// content, never an error (legacy or just-created spots).
    pub async fn content(store: &dyn DocumentStore, id: &str) -> Result<SpotContent, CoreError> {
        let doc = store
            .get(SPOT_CONTENTS_COLLECTION, id)
            .await
            .map_err(CoreError::from)?;
        Ok(doc
            .map(|data| SpotContent::from_wire(&data, id))
            .unwrap_or_else(|| SpotContent::empty(id)))
    }

    /// Create a new spot at `location`, writing pointer and content in
    /// one atomic batch.
    pub async fn create(
        store: &dyn DocumentStore,
        submission: SpotSubmission,
        location: GeoPoint,
        author: SpotAuthor,
    ) -> Result<Spot, CoreError> {
        if !location.is_valid() {
            return Err(CoreError::Validation("Spot location must be finite".into()));
        }

        let (photo_urls, thumbnail_url) = prepare_photos(&submission, None)?;
        let spot = Spot {
            id: new_doc_id(),
            name: submission.name.filter(|n| !n.is_empty()),
            location,
            category: submission.category.unwrap_or(SpotCategory::Caution),
            tags: submission.tags,
            thumbnail_url,
            created_at: chrono::Utc::now(),
            created_by: author,
        };
        let content = SpotContent {
            id: spot.id.clone(),
            memo: submission.memo,
            photo_urls,
        };

        let mut batch = WriteBatch::new();
        batch.push(WriteOp::set(SPOTS_COLLECTION, &spot.id, spot::to_wire(&spot)));
        batch.push(WriteOp::set(
            SPOT_CONTENTS_COLLECTION,
            &content.id,
            content.to_wire(),
        ));
        store.commit(batch).await?;
        Ok(spot)
    }

    /// Edit an existing spot, reusing its id for both sub-documents.
    ///
    /// The pointer is merge-written so `location`, `createdAt`, and
    /// `createdBy` stay untouched; the content record is replaced
    /// outright since this write owns all of its fields.
    pub async fn edit(
        store: &dyn DocumentStore,
        id: &str,
        submission: SpotSubmission,
    ) -> Result<(), CoreError> {
        let existing = Self::find(store, id).await?.ok_or(CoreError::NotFound {
            entity: "spot",
            id: id.to_string(),
        })?;

        let prior_thumbnail = existing.spot().thumbnail_url.clone();
        let (photo_urls, thumbnail_url) = prepare_photos(&submission, prior_thumbnail)?;

        let mut pointer_patch = serde_json::json!({
            "tags": submission.tags,
        });
        if let Some(category) = submission.category {
            pointer_patch["category"] = serde_json::json!(category.as_str());
        }
        if let Some(name) = submission.name {
            pointer_patch["name"] = serde_json::json!(name);
        }
        if let Some(thumb) = thumbnail_url {
            pointer_patch["thumbnailUrl"] = serde_json::json!(thumb);
        }

        let content = SpotContent {
            id: id.to_string(),
            memo: submission.memo,
            photo_urls,
        };

        let mut batch = WriteBatch::new();
        batch.push(WriteOp::set_merge(SPOTS_COLLECTION, id, pointer_patch));
        batch.push(WriteOp::set(SPOT_CONTENTS_COLLECTION, id, content.to_wire()));
        store.commit(batch).await?;
        Ok(())
    }

    /// Delete a spot: pointer and content go in one batch.
    pub async fn delete(store: &dyn DocumentStore, id: &str) -> Result<bool, CoreError> {
        let existed = store
            .get(SPOTS_COLLECTION, id)
            .await
            .map_err(CoreError::from)?
            .is_some();
        if existed {
            let mut batch = WriteBatch::new();
            batch.push(WriteOp::delete(SPOTS_COLLECTION, id));
            batch.push(WriteOp::delete(SPOT_CONTENTS_COLLECTION, id));
            store.commit(batch).await?;
        }
        Ok(existed)
    }

    /// Import parsed CSV records, writing each pointer/content pair.
    ///
    /// Pairs are pushed adjacently into one op sequence and partitioned
    /// by the store's batch limit, so large imports follow the same
    /// batching discipline as restore. Returns the number of spots
    /// imported.
    pub async fn import(
        store: &dyn DocumentStore,
        records: Vec<CsvSpot>,
    ) -> Result<usize, CoreError> {
        let mut ops = Vec::with_capacity(records.len() * 2);
        let mut imported = 0;

        for record in records {
            if !record.location.is_valid() {
                continue;
            }
            let id = if record.id.is_empty() {
                new_doc_id()
            } else {
                record.id.clone()
            };
            let spot = Spot {
                id: id.clone(),
                name: (!record.name.is_empty()).then(|| record.name.clone()),
                location: record.location,
                category: record.category,
                tags: record.tags,
                thumbnail_url: derive_thumbnail(&record.photo_urls, None),
                created_at: record.created_at,
                created_by: record.created_by,
            };
            let content = SpotContent {
                id: id.clone(),
                memo: record.memo,
                photo_urls: record.photo_urls,
            };

            ops.push(WriteOp::set(SPOTS_COLLECTION, &id, spot::to_wire(&spot)));
            ops.push(WriteOp::set(SPOT_CONTENTS_COLLECTION, &id, content.to_wire()));
            imported += 1;
        }

        commit_all(store, partition(ops, store.batch_limit())).await?;
        Ok(imported)
    }
}

/// Build the final photo list and thumbnail for a submission.
///
/// Newly attached photos are compressed and data-URI encoded, then
/// concatenated ahead of the kept URLs, capped at
/// [`MAX_PHOTOS_PER_SPOT`]. An empty combined list rejects the
/// submission before any write.
fn prepare_photos(
    submission: &SpotSubmission,
    prior_thumbnail: Option<String>,
) -> Result<(Vec<String>, Option<String>), CoreError> {
    let mut photo_urls = Vec::with_capacity(MAX_PHOTOS_PER_SPOT);
    for bytes in &submission.new_photos {
        photo_urls.push(photo::compress_to_data_uri(bytes)?);
    }
    photo_urls.extend(submission.kept_photo_urls.iter().cloned());

    if photo_urls.is_empty() {
        return Err(CoreError::Validation(
            "A spot requires at least one photo".into(),
        ));
    }
    photo_urls.truncate(MAX_PHOTOS_PER_SPOT);

    let thumbnail = derive_thumbnail(&photo_urls, prior_thumbnail);
    Ok((photo_urls, thumbnail))
}

/// Thumbnail from the first photo in the combined list, whether new or
/// kept. A legacy external URL cannot be decoded locally, so the prior
/// thumbnail is retained in that case.
fn derive_thumbnail(photo_urls: &[String], prior: Option<String>) -> Option<String> {
    match photo_urls.first() {
        Some(first) if photo::is_data_uri(first) => photo::thumbnail_from_data_uri(first).ok(),
        _ => prior,
    }
}
