//! Ingest Module
//!
//! Turns an uploaded CSV byte stream into a new dataset snapshot.
//!
//! ## Row Format
//! ```text
//! identifier,price,expiration
//! P1,19.99,2025-01-01 00:00:00 +0000 UTC
//! ```
//! - No header row: every row is data
//! - Exactly three columns, comma separated, permissive quoting
//! - Expiration layout: `YYYY-MM-DD HH:MM:SS[.fff] ±HHMM ZONE`
//!
//! ## All-or-Nothing
//! The whole stream is parsed into a staging `Vec` first. The store is only
//! touched once every row has validated; the first bad row or read error
//! aborts the upload and the previous dataset stays visible.

mod parser;
mod pipeline;

pub use parser::{parse_expiration, parse_price, parse_row, COLUMN_COUNT, EXPIRATION_FORMAT};
pub use pipeline::{ingest, parse_promotions, IngestSummary};
