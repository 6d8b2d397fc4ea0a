//! Error types for PromoKV
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using PromoError
pub type Result<T> = std::result::Result<T, PromoError>;

/// Unified error type for PromoKV operations
#[derive(Debug, Error)]
pub enum PromoError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Ingestion Errors
    // -------------------------------------------------------------------------
    /// The upload stream could not be read to the end
    #[error("Stream read error{}: {message}", line_suffix(.line))]
    StreamRead { line: Option<u64>, message: String },

    /// A row was read but one of its fields is malformed
    #[error("Parse error on line {line}: {field}")]
    FieldParse { line: u64, field: FieldError },

    /// The upload is larger than the configured limit
    #[error("Upload too large: {size} bytes (max {limit})")]
    UploadTooLarge { size: usize, limit: usize },

    /// The transport had no upload to hand to the pipeline
    #[error("file not found: {0}")]
    MissingUpload(String),

    // -------------------------------------------------------------------------
    // Lookup Errors
    // -------------------------------------------------------------------------
    #[error("Promotion not found")]
    NotFound,

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Network error: {0}")]
    Network(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The server answered a request with an error status
    #[error("Server error: {0}")]
    Server(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PromoError {
    /// True for failures that abort an ingestion without touching the store
    pub fn is_ingest_failure(&self) -> bool {
        matches!(
            self,
            PromoError::StreamRead { .. } | PromoError::FieldParse { .. }
        )
    }
}

impl From<csv::Error> for PromoError {
    fn from(err: csv::Error) -> Self {
        PromoError::StreamRead {
            line: err.position().map(|p| p.line()),
            message: err.to_string(),
        }
    }
}

impl From<bincode::Error> for PromoError {
    fn from(err: bincode::Error) -> Self {
        PromoError::Serialization(err.to_string())
    }
}

fn line_suffix(line: &Option<u64>) -> String {
    match line {
        Some(line) => format!(" on line {}", line),
        None => String::new(),
    }
}

/// A single column that failed validation
///
/// Price and expiration failures stay distinct so a rejected upload can be
/// traced to the offending column.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    #[error("expected {expected} columns, found {found}")]
    ColumnCount { expected: usize, found: usize },

    #[error("invalid price {value:?}: {reason}")]
    InvalidPrice { value: String, reason: String },

    #[error("invalid expiration {value:?}: {reason}")]
    InvalidExpiration { value: String, reason: String },
}
