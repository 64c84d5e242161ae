use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::batch::WriteBatch;
use crate::error::StoreError;

/// A raw document: store id plus JSON payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

/// Collection-oriented document store.
///
/// A committed [`WriteBatch`] applies atomically from any reader's
/// perspective; `batch_limit` is the store's per-commit operation
/// ceiling, which bulk engines must respect when partitioning work.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a single document, `None` when absent.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError>;

    /// List every document in a collection.
    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError>;

    /// Apply a batch of mutations atomically.
    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError>;

    /// Maximum operations accepted in one committed batch.
    fn batch_limit(&self) -> usize;
}
