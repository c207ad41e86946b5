//! In-memory sequence store for tests.

use async_trait::async_trait;
use hireline_core::{RecordId, SequencedCollection};
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::sequence::{SequenceStore, SequenceTx};
use crate::{DbError, DbResult};

type Key = (SequencedCollection, RecordId);

#[derive(Default)]
struct MemoryState {
    rows: BTreeMap<Key, Option<i32>>,
    failing_ids: HashSet<RecordId>,
    transactions_started: usize,
    rollbacks: usize,
}

/// Sequence columns held in a map. Writes are staged per transaction and only
/// become visible on commit.
#[derive(Clone, Default)]
pub struct MemorySequenceStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemorySequenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn seed(&self, collection: SequencedCollection, id: RecordId, sequence: Option<i32>) {
        self.lock().rows.insert((collection, id), sequence);
    }

    /// Make every update touching `id` fail, in any collection.
    pub fn fail_on(&self, id: RecordId) {
        self.lock().failing_ids.insert(id);
    }

    /// `None` when the row does not exist, `Some(None)` when its sequence is null.
    pub fn sequence(&self, collection: SequencedCollection, id: RecordId) -> Option<Option<i32>> {
        self.lock().rows.get(&(collection, id)).copied()
    }

    /// All rows of a collection as `(id, sequence)`, by id.
    pub fn snapshot(&self, collection: SequencedCollection) -> Vec<(i64, Option<i32>)> {
        self.lock()
            .rows
            .iter()
            .filter(|((c, _), _)| *c == collection)
            .map(|((_, id), sequence)| (id.get(), *sequence))
            .collect()
    }

    /// Ids in display order: ascending sequence, nulls last, ties by id.
    pub fn ordered_ids(&self, collection: SequencedCollection) -> Vec<i64> {
        let mut rows = self.snapshot(collection);
        rows.sort_by_key(|(id, sequence)| (sequence.is_none(), *sequence, *id));
        rows.into_iter().map(|(id, _)| id).collect()
    }

    pub fn transactions_started(&self) -> usize {
        self.lock().transactions_started
    }

    pub fn rollbacks(&self) -> usize {
        self.lock().rollbacks
    }
}

#[async_trait]
impl SequenceStore for MemorySequenceStore {
    async fn begin(&self) -> DbResult<Box<dyn SequenceTx>> {
        self.lock().transactions_started += 1;
        Ok(Box::new(MemorySequenceTx {
            store: self.clone(),
            staged: Vec::new(),
        }))
    }
}

struct MemorySequenceTx {
    store: MemorySequenceStore,
    staged: Vec<(Key, Option<i32>)>,
}

#[async_trait]
impl SequenceTx for MemorySequenceTx {
    async fn update_sequence(
        &mut self,
        collection: SequencedCollection,
        id: RecordId,
        sequence: Option<i32>,
    ) -> DbResult<u64> {
        let state = self.store.lock();
        if state.failing_ids.contains(&id) {
            return Err(DbError::Constraint(format!(
                "{} {} (injected failure)",
                collection.table(),
                id
            )));
        }
        if !state.rows.contains_key(&(collection, id)) {
            return Ok(0);
        }
        drop(state);
        self.staged.push(((collection, id), sequence));
        Ok(1)
    }

    async fn commit(self: Box<Self>) -> DbResult<()> {
        let this = *self;
        let mut state = this.store.lock();
        for (key, sequence) in this.staged {
            state.rows.insert(key, sequence);
        }
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> DbResult<()> {
        self.store.lock().rollbacks += 1;
        Ok(())
    }
}
