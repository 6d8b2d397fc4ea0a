//! Store Module
//!
//! In-memory home of the currently loaded promotions.
//!
//! ## Responsibilities
//! - Hold one immutable dataset snapshot (records + id index)
//! - Swap in a whole new snapshot atomically on reload
//! - Serve point lookups concurrently with each other
//!
//! ## Data Structure Choice
//! A `Vec` of records plus a `HashMap` from id to position, frozen inside an
//! `Arc<Snapshot>`. The live handle sits behind a `parking_lot::RwLock`:
//! - Readers take the read lock only long enough to index into the snapshot
//! - A reload builds the next snapshot with no lock held, then replaces the
//!   `Arc` under the write lock in one step
//! - Readers never see an index from one load paired with records from another

mod snapshot;
mod table;

pub use snapshot::Snapshot;
pub use table::PromotionStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Point-in-time description of the installed dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    /// Rows in the installed collection (duplicates included)
    pub records: usize,

    /// Distinct ids reachable through the index
    pub distinct_ids: usize,

    /// Number of completed reloads (0 = nothing loaded yet)
    pub generation: u64,

    /// When the installed snapshot was built
    pub loaded_at: DateTime<Utc>,
}
