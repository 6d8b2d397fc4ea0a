//! Dataset snapshot
//!
//! An immutable collection of promotions and its id index.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::record::Promotion;

use super::StoreStats;

/// The complete, internally consistent state of the store at one point in time
///
/// Never mutated once built. The index maps each id to the position of its
/// last occurrence in `records`.
#[derive(Debug)]
pub struct Snapshot {
    records: Vec<Promotion>,
    index: HashMap<String, usize>,
    generation: u64,
    loaded_at: DateTime<Utc>,
}

impl Snapshot {
    /// The empty snapshot installed at startup
    pub fn empty() -> Self {
        Self {
            records: Vec::new(),
            index: HashMap::new(),
            generation: 0,
            loaded_at: Utc::now(),
        }
    }

    /// Build a snapshot from records in upload order
    ///
    /// Later duplicates overwrite the index entry of earlier ones.
    pub fn build(records: Vec<Promotion>, generation: u64) -> Self {
        let mut index = HashMap::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            index.insert(record.id.clone(), position);
        }

        Self {
            records,
            index,
            generation,
            loaded_at: Utc::now(),
        }
    }

    /// Get a record by id
    pub fn get(&self, id: &str) -> Option<&Promotion> {
        self.index.get(id).map(|&position| &self.records[position])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Records in upload order, duplicates included
    pub fn records(&self) -> &[Promotion] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of ids reachable through the index
    pub fn distinct_ids(&self) -> usize {
        self.index.len()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Stamp the generation just before publication
    pub(super) fn set_generation(&mut self, generation: u64) {
        self.generation = generation;
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            records: self.records.len(),
            distinct_ids: self.index.len(),
            generation: self.generation,
            loaded_at: self.loaded_at,
        }
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::empty()
    }
}
