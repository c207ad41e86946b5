//! Atomic reordering of sequenced collections.
//!
//! A reorder batch rewrites the `sequence` column of many rows at once. The
//! whole batch runs inside one transaction so readers see either the old
//! ordering or the new one, never a mix.

use async_trait::async_trait;
use hireline_core::{RawSequenceEntry, RecordId, SequencedCollection, normalize_entries};
use sqlx::{PgPool, Postgres, Transaction};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::DbResult;

/// Opens transactions against the store holding sequenced collections.
#[async_trait]
pub trait SequenceStore: Send + Sync {
    async fn begin(&self) -> DbResult<Box<dyn SequenceTx>>;
}

/// A unit of work scoped to one reorder batch.
///
/// Dropping a transaction without calling [`SequenceTx::commit`] discards its writes.
#[async_trait]
pub trait SequenceTx: Send {
    /// Set `sequence` on a single row. Returns the number of rows matched.
    async fn update_sequence(
        &mut self,
        collection: SequencedCollection,
        id: RecordId,
        sequence: Option<i32>,
    ) -> DbResult<u64>;

    async fn commit(self: Box<Self>) -> DbResult<()>;

    async fn rollback(self: Box<Self>) -> DbResult<()>;
}

/// PostgreSQL implementation of SequenceStore.
pub struct PgSequenceStore {
    pool: PgPool,
}

impl PgSequenceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SequenceStore for PgSequenceStore {
    async fn begin(&self) -> DbResult<Box<dyn SequenceTx>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgSequenceTx { tx }))
    }
}

struct PgSequenceTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl SequenceTx for PgSequenceTx {
    async fn update_sequence(
        &mut self,
        collection: SequencedCollection,
        id: RecordId,
        sequence: Option<i32>,
    ) -> DbResult<u64> {
        let sql = format!(
            "UPDATE {} SET sequence = $1 WHERE id = $2",
            collection.table()
        );
        let result = sqlx::query(&sql)
            .bind(sequence)
            .bind(id.get())
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected())
    }

    async fn commit(self: Box<Self>) -> DbResult<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> DbResult<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}

/// Applies reorder batches to any [`SequenceStore`].
#[derive(Clone)]
pub struct SequenceReorderer {
    store: Arc<dyn SequenceStore>,
}

impl SequenceReorderer {
    pub fn new(store: Arc<dyn SequenceStore>) -> Self {
        Self { store }
    }

    /// Persist a reorder batch atomically.
    ///
    /// Returns the number of entries attempted after normalization. Ids that
    /// match no row still count as attempted. An empty batch never opens a
    /// transaction.
    pub async fn reorder(
        &self,
        collection: SequencedCollection,
        entries: Vec<RawSequenceEntry>,
    ) -> DbResult<usize> {
        let received = entries.len();
        let batch = normalize_entries(entries);
        if batch.is_empty() {
            debug!(collection = ?collection, received, "Empty reorder batch, nothing to do");
            return Ok(0);
        }

        let mut tx = self.store.begin().await?;
        let mut matched = 0u64;
        for assignment in &batch {
            match tx
                .update_sequence(collection, assignment.id, assignment.sequence)
                .await
            {
                Ok(rows) => matched += rows,
                Err(e) => {
                    warn!(
                        collection = ?collection,
                        id = %assignment.id,
                        error = %e,
                        "Sequence update failed, rolling back batch"
                    );
                    if let Err(rollback_err) = tx.rollback().await {
                        warn!(error = %rollback_err, "Rollback failed");
                    }
                    return Err(e);
                }
            }
        }
        tx.commit().await?;

        info!(
            collection = ?collection,
            received,
            attempted = batch.len(),
            matched,
            "Reordered collection"
        );
        Ok(batch.len())
    }
}
