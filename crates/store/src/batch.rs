//! Write operations, batches, and the bulk partitioning discipline.

use serde_json::Value;

use crate::error::StoreError;
use crate::store::DocumentStore;

/// Default per-commit operation ceiling of the hosted store.
///
/// A property of the store adapter, overridable per store instance;
/// engine logic must only ever consult [`DocumentStore::batch_limit`].
pub const DEFAULT_BATCH_LIMIT: usize = 400;

/// A single document mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Write a document. With `merge`, fields absent from `data` keep
    /// their stored values; without it the document is replaced.
    Set {
        collection: String,
        id: String,
        data: Value,
        merge: bool,
    },
    Delete {
        collection: String,
        id: String,
    },
}

impl WriteOp {
    pub fn set(collection: impl Into<String>, id: impl Into<String>, data: Value) -> Self {
        Self::Set {
            collection: collection.into(),
            id: id.into(),
            data,
            merge: false,
        }
    }

    pub fn set_merge(collection: impl Into<String>, id: impl Into<String>, data: Value) -> Self {
        Self::Set {
            collection: collection.into(),
            id: id.into(),
            data,
            merge: true,
        }
    }

    pub fn delete(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self::Delete {
            collection: collection.into(),
            id: id.into(),
        }
    }
}

/// An ordered group of mutations applied atomically by
/// [`DocumentStore::commit`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    pub ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(op: WriteOp) -> Self {
        Self { ops: vec![op] }
    }

    pub fn push(&mut self, op: WriteOp) {
        self.ops.push(op);
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

impl FromIterator<WriteOp> for WriteBatch {
    fn from_iter<I: IntoIterator<Item = WriteOp>>(iter: I) -> Self {
        Self {
            ops: iter.into_iter().collect(),
        }
    }
}

/// Partition `ops` into batches of at most `limit` operations each.
///
/// N ops always yield exactly `ceil(N / limit)` batches, order
/// preserved, no batch empty.
pub fn partition(ops: Vec<WriteOp>, limit: usize) -> Vec<WriteBatch> {
    assert!(limit > 0, "batch limit must be positive");

    let mut batches = Vec::with_capacity(ops.len().div_ceil(limit));
    let mut current = WriteBatch::new();
    for op in ops {
        current.push(op);
        if current.len() == limit {
            batches.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        batches.push(current);
    }
    batches
}

/// Commit every batch concurrently and wait for all of them to settle.
///
/// The first failure aborts the wait; already-committed batches are not
/// rolled back (bulk operations are atomic per batch only).
pub async fn commit_all(
    store: &dyn DocumentStore,
    batches: Vec<WriteBatch>,
) -> Result<(), StoreError> {
    futures::future::try_join_all(batches.into_iter().map(|batch| store.commit(batch))).await?;
    Ok(())
}
