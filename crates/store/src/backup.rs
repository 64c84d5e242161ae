//! Full-collection JSON backup and destructive batched restore.
//!
//! Restore is a delete-everything-then-insert sequence: atomic within
//! each batch, not across batches or phases. A failure partway leaves
//! the collection in a mixed state with no rollback, and a concurrent
//! writer can interleave with a running restore (no collection-level
//! lock is taken). Both limitations are surfaced to operators as
//! best-effort semantics rather than papered over.

use chrono::NaiveDate;
use serde_json::Value;

use postmap_core::area::{self, Area};
use postmap_core::error::CoreError;
use postmap_core::types::new_doc_id;

use crate::batch::{commit_all, partition, WriteOp};
use crate::store::DocumentStore;
use crate::{AREAS_COLLECTION, SPOTS_COLLECTION, SPOT_CONTENTS_COLLECTION};

/// Backup filename: `posting-map-backup-<YYYY-MM-DD>.json`.
pub fn backup_filename(date: NaiveDate) -> String {
    format!("posting-map-backup-{date}.json")
}

/// Outcome of a completed restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct RestoreSummary {
    pub deleted: usize,
    pub restored: usize,
}

/// Export and destructive re-import of the area collection, plus the
/// danger-zone bulk deletes.
pub struct BackupEngine;

impl BackupEngine {
    /// Export every area as its portable backup record: structured
    /// geometry, `{seconds, nanoseconds}` timestamps, id included.
    pub async fn export_areas(store: &dyn DocumentStore) -> Result<Value, CoreError> {
        let docs = store.list(AREAS_COLLECTION).await.map_err(CoreError::from)?;
        let areas: Vec<Value> = docs
            .iter()
            .map(|doc| {
                let area = area::from_wire(&doc.data, &doc.id);
                serde_json::to_value(&area)
                    .map_err(|e| CoreError::Internal(format!("Backup serialization failed: {e}")))
            })
            .collect::<Result<_, _>>()?;
        Ok(Value::Array(areas))
    }

    /// Replace the entire area collection with the backup's contents.
    ///
    /// Every record is validated (timestamp shape included) before the
    /// first write is issued, so a malformed file aborts with
    /// [`CoreError::Format`] leaving the store untouched. The delete
    /// phase is awaited in full before the insert phase begins, so
    /// stale and restored records can never collide on an id.
    pub async fn restore_areas(
        store: &dyn DocumentStore,
        backup: &Value,
    ) -> Result<RestoreSummary, CoreError> {
        let records = backup
            .as_array()
            .ok_or_else(|| CoreError::Format("Backup root must be an array".into()))?;

        let areas: Vec<Area> = records
            .iter()
            .enumerate()
            .map(|(i, record)| {
                serde_json::from_value(record.clone())
                    .map_err(|e| CoreError::Format(format!("Backup record {i}: {e}")))
            })
            .collect::<Result<_, _>>()?;

        let limit = store.batch_limit();

        // Delete phase: clear out every existing document.
        let existing = store.list(AREAS_COLLECTION).await.map_err(CoreError::from)?;
        let deleted = existing.len();
        let deletes = existing
            .into_iter()
            .map(|doc| WriteOp::delete(AREAS_COLLECTION, doc.id))
            .collect();
        commit_all(store, partition(deletes, limit)).await?;
        tracing::info!(deleted, "Restore delete phase complete");

        // Insert phase, only after every delete batch settled.
        let restored = areas.len();
        let inserts = areas
            .into_iter()
            .map(|area| {
                let id = if area.id.is_empty() {
                    new_doc_id()
                } else {
                    area.id.clone()
                };
                WriteOp::set(AREAS_COLLECTION, id, area::to_wire(&area))
            })
            .collect();
        commit_all(store, partition(inserts, limit)).await?;
        tracing::info!(restored, "Restore insert phase complete");

        Ok(RestoreSummary { deleted, restored })
    }

    /// Danger zone: delete every area document. Returns the count removed.
    pub async fn purge_areas(store: &dyn DocumentStore) -> Result<usize, CoreError> {
        let docs = store.list(AREAS_COLLECTION).await.map_err(CoreError::from)?;
        let count = docs.len();
        let deletes = docs
            .into_iter()
            .map(|doc| WriteOp::delete(AREAS_COLLECTION, doc.id))
            .collect();
        commit_all(store, partition(deletes, store.batch_limit())).await?;
        tracing::warn!(count, "Purged area collection");
        Ok(count)
    }

    /// Danger zone: delete every spot pointer and content document.
    ///
    /// Both collections feed one interleaved op sequence, so a batch
    /// flush triggers at the limit regardless of which collection
    /// contributed the final op.
    pub async fn purge_spots(store: &dyn DocumentStore) -> Result<usize, CoreError> {
        let spots = store.list(SPOTS_COLLECTION).await.map_err(CoreError::from)?;
        let contents = store
            .list(SPOT_CONTENTS_COLLECTION)
            .await
            .map_err(CoreError::from)?;

        let deletes: Vec<WriteOp> = spots
            .into_iter()
            .map(|doc| WriteOp::delete(SPOTS_COLLECTION, doc.id))
            .chain(
                contents
                    .into_iter()
                    .map(|doc| WriteOp::delete(SPOT_CONTENTS_COLLECTION, doc.id)),
            )
            .collect();
        let count = deletes.len();
        commit_all(store, partition(deletes, store.batch_limit())).await?;
        tracing::warn!(count, "Purged spot collections");
        Ok(count)
    }
}
