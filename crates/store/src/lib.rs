//! Document store adapter and the multi-document write engines.
//!
//! The [`DocumentStore`] trait is the sole persistence seam: the area
//! repository, the spot split-write protocol, and the backup/restore
//! engine are all store-agnostic. Two implementations ship here: the
//! jsonb-backed [`PgStore`] for production and the [`MemoryStore`] used
//! by tests and local development.

pub mod areas;
pub mod backup;
pub mod batch;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod spots;
mod store;

pub use batch::{commit_all, partition, WriteBatch, WriteOp, DEFAULT_BATCH_LIMIT};
pub use error::StoreError;
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use store::{Document, DocumentStore};

/// Collection of area documents.
pub const AREAS_COLLECTION: &str = "posting_areas";
/// Collection of spot pointer documents.
pub const SPOTS_COLLECTION: &str = "spots";
/// Collection of spot content documents, keyed 1:1 by spot id.
pub const SPOT_CONTENTS_COLLECTION: &str = "spots_contents";
