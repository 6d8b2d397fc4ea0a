//! # PromoKV
//!
//! An in-memory promotion price store with:
//! - Whole-dataset reloads from CSV uploads (all-or-nothing)
//! - Atomic snapshot publication, so readers never see a half-built index
//! - Concurrent point lookups by promotion id
//! - TCP-based client protocol
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │                  (Multiple Clients)                          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                        Engine                                │
//! │              (LOOKUP / UPLOAD / STATS routing)               │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │   Ingest    │ replace  │    Store    │
//!   │ (CSV parse) ├─────────►│ (RwLock<Arc │
//!   └─────────────┘          │  Snapshot>) │
//!                            └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod record;
pub mod store;
pub mod ingest;
pub mod network;
pub mod protocol;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{FieldError, PromoError, Result};
pub use config::{Config, Profile};
pub use engine::Engine;
pub use record::{Promotion, PromotionView};
pub use store::{PromotionStore, Snapshot, StoreStats};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of PromoKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
