//! PostgreSQL-backed document store.
//!
//! All collections share one `documents` table keyed by `(collection,
//! id)` with a jsonb payload. A write batch commits inside a single SQL
//! transaction, which gives readers the same all-or-nothing visibility
//! as a hosted document store's batched write.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::batch::{WriteBatch, WriteOp, DEFAULT_BATCH_LIMIT};
use crate::error::StoreError;
use crate::store::{Document, DocumentStore};

/// Shared connection pool type.
pub type DbPool = PgPool;

/// Create a connection pool against the given database URL.
pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
}

/// Apply pending migrations (the `documents` table).
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Verify the database is reachable.
pub async fn health_check(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

pub struct PgStore {
    pool: PgPool,
    batch_limit: usize,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self::with_batch_limit(pool, DEFAULT_BATCH_LIMIT)
    }

    pub fn with_batch_limit(pool: PgPool, batch_limit: usize) -> Self {
        Self { pool, batch_limit }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let data = sqlx::query_scalar::<_, Value>(
            "SELECT data FROM documents WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(data)
    }

    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let rows = sqlx::query_as::<_, (String, Value)>(
            "SELECT id, data FROM documents WHERE collection = $1 ORDER BY id",
        )
        .bind(collection)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(id, data)| Document { id, data })
            .collect())
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        if batch.len() > self.batch_limit {
            return Err(StoreError::Backend(format!(
                "batch of {} ops exceeds the {}-op limit",
                batch.len(),
                self.batch_limit
            )));
        }

        let mut tx = self.pool.begin().await?;
        for op in batch.ops {
            match op {
                WriteOp::Set {
                    collection,
                    id,
                    data,
                    merge: false,
                } => {
                    sqlx::query(
                        "INSERT INTO documents (collection, id, data, updated_at)
                         VALUES ($1, $2, $3, NOW())
                         ON CONFLICT (collection, id)
                         DO UPDATE SET data = EXCLUDED.data, updated_at = NOW()",
                    )
                    .bind(&collection)
                    .bind(&id)
                    .bind(&data)
                    .execute(&mut *tx)
                    .await?;
                }
                WriteOp::Set {
                    collection,
                    id,
                    data,
                    merge: true,
                } => {
                    // jsonb concatenation: incoming top-level fields win,
                    // absent fields keep their stored values.
                    sqlx::query(
                        "INSERT INTO documents (collection, id, data, updated_at)
                         VALUES ($1, $2, $3, NOW())
                         ON CONFLICT (collection, id)
                         DO UPDATE SET data = documents.data || EXCLUDED.data, updated_at = NOW()",
                    )
                    .bind(&collection)
                    .bind(&id)
                    .bind(&data)
                    .execute(&mut *tx)
                    .await?;
                }
                WriteOp::Delete { collection, id } => {
                    sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
                        .bind(&collection)
                        .bind(&id)
                        .execute(&mut *tx)
                        .await?;
                }
            }
        }
        tx.commit().await?;
        Ok(())
    }

    fn batch_limit(&self) -> usize {
        self.batch_limit
    }
}
