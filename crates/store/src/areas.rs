//! Area collection access.
//!
//! No ownership is enforced on mutation: any authorized user may update
//! any area, and the last write wins at the record level.

use serde::Deserialize;
use serde_json::json;

use postmap_core::area::{self, Area, AreaStatus, Geometry};
use postmap_core::error::CoreError;
use postmap_core::types::{new_doc_id, UserRef, WireTimestamp};

use crate::batch::{WriteBatch, WriteOp};
use crate::store::DocumentStore;
use crate::AREAS_COLLECTION;

/// DTO for creating a new area.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateArea {
    pub geometry: Geometry,
    #[serde(default)]
    pub status: AreaStatus,
    #[serde(default)]
    pub memo: String,
    #[serde(default)]
    pub planned_count: Option<i64>,
}

/// DTO for updating an existing area. All fields are optional; omitted
/// fields are left untouched in the store (merge-set semantics).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateArea {
    pub status: Option<AreaStatus>,
    pub memo: Option<String>,
    pub planned_count: Option<i64>,
    pub actual_count: Option<i64>,
}

/// Provides CRUD operations for areas.
pub struct AreaStore;

impl AreaStore {
    /// List every area. Documents with unreadable geometry come back
    /// with the invalid sentinel, never an error.
    pub async fn list(store: &dyn DocumentStore) -> Result<Vec<Area>, CoreError> {
        let docs = store.list(AREAS_COLLECTION).await.map_err(CoreError::from)?;
        Ok(docs
            .iter()
            .map(|doc| area::from_wire(&doc.data, &doc.id))
            .collect())
    }

    pub async fn find(store: &dyn DocumentStore, id: &str) -> Result<Option<Area>, CoreError> {
        let doc = store.get(AREAS_COLLECTION, id).await.map_err(CoreError::from)?;
        Ok(doc.map(|data| area::from_wire(&data, id)))
    }

    /// Insert a new area drawn by `user`, returning the stored record.
    pub async fn create(
        store: &dyn DocumentStore,
        input: CreateArea,
        user: UserRef,
    ) -> Result<Area, CoreError> {
        if !input.geometry.is_renderable() {
            return Err(CoreError::Validation(
                "Area geometry needs a ring of at least 3 points".into(),
            ));
        }

        let now = chrono::Utc::now();
        let area = Area {
            id: new_doc_id(),
            geometry: input.geometry,
            status: input.status,
            planned_count: input.planned_count,
            actual_count: None,
            memo: input.memo,
            created_at: now,
            updated_at: now,
            updated_by: user,
        };

        let op = WriteOp::set(AREAS_COLLECTION, &area.id, area::to_wire(&area));
        store.commit(WriteBatch::single(op)).await?;
        Ok(area)
    }

    /// Update an area. Only the provided fields change; `updatedAt` and
    /// `updatedBy` always move to the caller.
    ///
    /// Returns `None` if no document with the given id exists.
    pub async fn update(
        store: &dyn DocumentStore,
        id: &str,
        input: UpdateArea,
        user: UserRef,
    ) -> Result<Option<Area>, CoreError> {
        if store.get(AREAS_COLLECTION, id).await.map_err(CoreError::from)?.is_none() {
            return Ok(None);
        }

        let mut patch = json!({
            "updatedAt": WireTimestamp::from(chrono::Utc::now()),
            "updatedBy": user,
        });
        if let Some(status) = input.status {
            patch["status"] = json!(status.as_str());
        }
        if let Some(memo) = input.memo {
            patch["memo"] = json!(memo);
        }
        if let Some(n) = input.planned_count {
            patch["plannedCount"] = json!(n);
        }
        if let Some(n) = input.actual_count {
            patch["actualCount"] = json!(n);
        }

        let op = WriteOp::set_merge(AREAS_COLLECTION, id, patch);
        store.commit(WriteBatch::single(op)).await?;

        Self::find(store, id).await
    }

    /// Delete an area by id. Returns `true` if a document was removed.
    pub async fn delete(store: &dyn DocumentStore, id: &str) -> Result<bool, CoreError> {
        let existed = store
            .get(AREAS_COLLECTION, id)
            .await
            .map_err(CoreError::from)?
            .is_some();
        if existed {
            let op = WriteOp::delete(AREAS_COLLECTION, id);
            store.commit(WriteBatch::single(op)).await?;
        }
        Ok(existed)
    }
}
