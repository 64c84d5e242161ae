//! In-memory document store used by tests and local development.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::batch::{WriteBatch, WriteOp, DEFAULT_BATCH_LIMIT};
use crate::error::StoreError;
use crate::store::{Document, DocumentStore};

/// `RwLock`-guarded map of collections. A batch applies under a single
/// write-lock acquisition, which gives it the same all-or-nothing
/// visibility a hosted store's transaction log provides.
pub struct MemoryStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Value>>>,
    commits: AtomicUsize,
    batch_limit: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_batch_limit(DEFAULT_BATCH_LIMIT)
    }

    pub fn with_batch_limit(batch_limit: usize) -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            commits: AtomicUsize::new(0),
            batch_limit,
        }
    }

    /// Number of batches committed so far. Test instrumentation for the
    /// batch-sizing law.
    pub fn commit_count(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    /// Document count in a collection.
    pub async fn doc_count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, BTreeMap::len)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, data)| Document {
                        id: id.clone(),
                        data: data.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        if batch.len() > self.batch_limit {
            return Err(StoreError::Backend(format!(
                "batch of {} ops exceeds the {}-op limit",
                batch.len(),
                self.batch_limit
            )));
        }

        let mut collections = self.collections.write().await;
        for op in batch.ops {
            match op {
                WriteOp::Set {
                    collection,
                    id,
                    data,
                    merge,
                } => {
                    let docs = collections.entry(collection).or_default();
                    match docs.get_mut(&id) {
                        Some(existing) if merge => merge_objects(existing, data),
                        _ => {
                            docs.insert(id, data);
                        }
                    }
                }
                WriteOp::Delete { collection, id } => {
                    if let Some(docs) = collections.get_mut(&collection) {
                        docs.remove(&id);
                    }
                }
            }
        }

        self.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn batch_limit(&self) -> usize {
        self.batch_limit
    }
}

/// Shallow field merge: incoming top-level fields overwrite, absent
/// fields keep their stored values. Non-object documents are replaced.
fn merge_objects(existing: &mut Value, incoming: Value) {
    match (existing.as_object_mut(), incoming) {
        (Some(target), Value::Object(fields)) => {
            for (key, value) in fields {
                target.insert(key, value);
            }
        }
        (_, incoming) => *existing = incoming,
    }
}
