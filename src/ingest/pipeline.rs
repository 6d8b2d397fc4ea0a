//! Ingestion pipeline
//!
//! Reads a whole upload into staging, then hands it to the store.

use std::io::Read;
use std::time::{Duration, Instant};

use csv::{ReaderBuilder, StringRecord};

use crate::error::{PromoError, Result};
use crate::record::Promotion;
use crate::store::PromotionStore;

use super::parser::parse_row;

/// Outcome of a successful ingestion
#[derive(Debug, Clone, PartialEq)]
pub struct IngestSummary {
    /// Rows read from the stream
    pub rows: usize,

    /// Distinct ids in the new dataset
    pub distinct_ids: usize,

    /// Generation of the snapshot that was published
    pub generation: u64,

    /// Time spent parsing and publishing
    pub elapsed: Duration,
}

impl IngestSummary {
    /// Rows whose id was overridden by a later row in the same upload
    pub fn duplicates(&self) -> usize {
        self.rows - self.distinct_ids
    }
}

/// Parse every row of `reader` into promotions, stopping at the first error
pub fn parse_promotions<R: Read>(reader: R) -> Result<Vec<Promotion>> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(false)
        .delimiter(b',')
        .flexible(true)
        .from_reader(reader);

    let mut promotions = Vec::new();
    let mut row = StringRecord::new();

    while csv_reader.read_record(&mut row)? {
        let line = row
            .position()
            .map(|p| p.line())
            .unwrap_or(promotions.len() as u64 + 1);

        let promotion = parse_row(&row).map_err(|field| PromoError::FieldParse { line, field })?;
        promotions.push(promotion);
    }

    Ok(promotions)
}

/// Parse `reader` fully and install the result as the store's dataset
///
/// On any error the store is left exactly as it was.
pub fn ingest<R: Read>(reader: R, store: &PromotionStore) -> Result<IngestSummary> {
    let started = Instant::now();

    let promotions = match parse_promotions(reader) {
        Ok(promotions) => promotions,
        Err(e) => {
            tracing::warn!(error = %e, "Ingestion aborted, keeping current dataset");
            return Err(e);
        }
    };

    let rows = promotions.len();
    let published = store.replace(promotions);

    let summary = IngestSummary {
        rows,
        distinct_ids: published.distinct_ids(),
        generation: published.generation(),
        elapsed: started.elapsed(),
    };

    tracing::info!(
        rows = summary.rows,
        duplicates = summary.duplicates(),
        generation = summary.generation,
        elapsed_ms = summary.elapsed.as_millis() as u64,
        "Ingested promotions"
    );

    Ok(summary)
}
