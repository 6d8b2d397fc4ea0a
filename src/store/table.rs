//! Promotion store
//!
//! Publishes dataset snapshots through an `RwLock<Arc<Snapshot>>`.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::record::Promotion;

use super::{Snapshot, StoreStats};

/// Shared store of the currently loaded promotions
///
/// ## Concurrency:
/// - `current`: read lock for lookups (many concurrent readers), write lock
///   only for the pointer swap in `replace`
/// - Snapshots are immutable; a reader holding an `Arc<Snapshot>` keeps a
///   consistent view even after a newer one is published
pub struct PromotionStore {
    current: RwLock<Arc<Snapshot>>,
}

impl PromotionStore {
    /// Create a store holding the empty snapshot
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(Snapshot::empty())),
        }
    }

    /// Install `records` as the whole dataset, discarding the previous one
    ///
    /// The index is built before any lock is taken. Returns the newly
    /// published snapshot.
    pub fn replace(&self, records: Vec<Promotion>) -> Arc<Snapshot> {
        let mut next = Snapshot::build(records, 0);

        let mut current = self.current.write();
        let generation = current.generation() + 1;
        next.set_generation(generation);
        let published = Arc::new(next);
        let previous = std::mem::replace(&mut *current, Arc::clone(&published));
        drop(current);

        tracing::debug!(
            generation,
            previous_records = previous.len(),
            "Published promotion snapshot"
        );
        published
    }

    /// Get a promotion by id from the current snapshot
    pub fn lookup(&self, id: &str) -> Option<Promotion> {
        self.current.read().get(id).cloned()
    }

    /// Handle on the current snapshot, for several reads against one dataset
    pub fn snapshot(&self) -> Arc<Snapshot> {
        let current = self.current.read();
        Arc::clone(&*current)
    }

    pub fn len(&self) -> usize {
        self.current.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.read().is_empty()
    }

    /// Number of completed replaces
    pub fn generation(&self) -> u64 {
        self.current.read().generation()
    }

    pub fn stats(&self) -> StoreStats {
        self.current.read().stats()
    }
}

impl Default for PromotionStore {
    fn default() -> Self {
        Self::new()
    }
}
