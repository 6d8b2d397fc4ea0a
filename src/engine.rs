//! Engine Module
//!
//! Coordinates the promotion store and the ingestion pipeline.
//!
//! ## Responsibilities
//! - Own the single store instance for the process
//! - Route decoded commands to lookups, uploads and stats
//! - Enforce upload limits before any parsing starts

use std::io::Read;

use crate::config::Config;
use crate::error::{PromoError, Result};
use crate::ingest::{self, IngestSummary};
use crate::protocol::Command;
use crate::record::{Promotion, PromotionView};
use crate::store::{PromotionStore, StoreStats};

/// Reply payload for a successful upload
pub const UPLOAD_OK: &[u8] = b"data updated";

/// The request coordinator
///
/// ## Concurrency Model
///
/// - **Lookups**: shared read access to the current snapshot, never
///   serialized against each other
/// - **Uploads**: parsed with no lock held; only the final snapshot swap
///   takes the store's write lock
/// - Concurrent uploads race to publish; the last one to finish wins
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// The process-wide promotion store
    store: PromotionStore,
}

impl Engine {
    /// Create an engine with an empty store
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            config,
            store: PromotionStore::new(),
        })
    }

    /// Execute a command
    ///
    /// Routes commands to appropriate handlers
    pub fn execute(&self, command: Command) -> Result<Option<Vec<u8>>> {
        match command {
            Command::Lookup { id } => {
                let view = self.lookup(&id)?;
                Ok(Some(bincode::serialize(&view)?))
            }
            Command::Upload { data } => {
                self.upload(&data)?;
                Ok(Some(UPLOAD_OK.to_vec()))
            }
            Command::Ping => Ok(Some(b"PONG".to_vec())),
            Command::Stats => Ok(Some(bincode::serialize(&self.stats())?)),
        }
    }

    /// Get a rendered promotion by id
    pub fn lookup(&self, id: &str) -> Result<PromotionView> {
        self.find(id)
            .map(|promotion| promotion.render())
            .ok_or(PromoError::NotFound)
    }

    /// Get a promotion by id at full precision
    pub fn find(&self, id: &str) -> Option<Promotion> {
        self.store.lookup(id)
    }

    /// Replace the dataset with an in-memory CSV upload
    pub fn upload(&self, data: &[u8]) -> Result<IngestSummary> {
        let limit = self.config.max_upload_bytes;
        if data.len() > limit {
            tracing::warn!(size = data.len(), limit, "Rejected oversized upload");
            return Err(PromoError::UploadTooLarge {
                size: data.len(),
                limit,
            });
        }

        self.ingest(data)
    }

    /// Replace the dataset with CSV read from any stream
    ///
    /// Reads past `max_upload_bytes` fail the upload.
    pub fn ingest<R: Read>(&self, reader: R) -> Result<IngestSummary> {
        let limit = self.config.max_upload_bytes;
        let mut bounded = LimitedReader::new(reader, limit);
        let result = ingest::ingest(&mut bounded, &self.store);

        if bounded.exceeded() {
            tracing::warn!(limit, "Rejected oversized upload stream");
            return Err(PromoError::UploadTooLarge {
                size: bounded.read_so_far(),
                limit,
            });
        }
        result
    }

    /// Describe the installed dataset
    pub fn stats(&self) -> StoreStats {
        self.store.stats()
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the underlying store
    pub fn store(&self) -> &PromotionStore {
        &self.store
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Reader that errors once more than `limit` bytes have been consumed
struct LimitedReader<R> {
    inner: R,
    limit: usize,
    read: usize,
    exceeded: bool,
}

impl<R: Read> LimitedReader<R> {
    fn new(inner: R, limit: usize) -> Self {
        Self {
            inner,
            limit,
            read: 0,
            exceeded: false,
        }
    }

    fn exceeded(&self) -> bool {
        self.exceeded
    }

    fn read_so_far(&self) -> usize {
        self.read
    }
}

impl<R: Read> Read for LimitedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.read += n;
        if self.read > self.limit {
            self.exceeded = true;
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("upload exceeds {} bytes", self.limit),
            ));
        }
        Ok(n)
    }
}
