//! Ingestion Tests
//!
//! Tests verify:
//! - Parsing of well-formed uploads
//! - Rendering of loaded records
//! - All-or-nothing behavior on bad rows and read errors
//! - Tolerance of loose quoting and CRLF line endings

use std::io::{self, Read};

use promokv::ingest::{ingest, parse_promotions};
use promokv::{FieldError, PromoError, PromotionStore};

// =============================================================================
// Helper Functions
// =============================================================================

const SCENARIO: &str = "P1,19.99,2025-01-01 00:00:00 +0000 UTC\n\
                        P2,5,2025-06-15 23:59:59 +0000 UTC\n";

fn row(id: &str, price: &str) -> String {
    format!("{},{},2025-01-01 00:00:00 +0000 UTC\n", id, price)
}

/// Yields `data`, then fails like a dropped upload
struct FailingReader {
    data: io::Cursor<Vec<u8>>,
}

impl Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.data.read(buf)?;
        if n == 0 {
            return Err(io::Error::new(io::ErrorKind::ConnectionReset, "upload interrupted"));
        }
        Ok(n)
    }
}

// =============================================================================
// Successful Ingestion Tests
// =============================================================================

#[test]
fn test_scenario_upload_then_lookup() {
    let store = PromotionStore::new();
    let summary = ingest(SCENARIO.as_bytes(), &store).unwrap();

    assert_eq!(summary.rows, 2);
    assert_eq!(summary.generation, 1);

    let p1 = store.lookup("P1").unwrap().render();
    assert_eq!(p1.price, "19.99");
    assert_eq!(p1.expiration_date, "2025-01-01 00:00:00");

    let p2 = store.lookup("P2").unwrap().render();
    assert_eq!(p2.price, "5.00");
    assert_eq!(p2.expiration_date, "2025-06-15 23:59:59");

    assert_eq!(store.lookup("P3"), None);
}

#[test]
fn test_first_row_is_data_not_header() {
    let promotions = parse_promotions(row("id", "1").as_bytes()).unwrap();
    assert_eq!(promotions.len(), 1);
    assert_eq!(promotions[0].id, "id");
}

#[test]
fn test_empty_upload_installs_empty_dataset() {
    let store = PromotionStore::new();
    ingest(SCENARIO.as_bytes(), &store).unwrap();

    let summary = ingest(io::empty(), &store).unwrap();
    assert_eq!(summary.rows, 0);
    assert!(store.is_empty());
    assert_eq!(store.lookup("P1"), None);
}

#[test]
fn test_duplicate_rows_counted_and_last_wins() {
    let store = PromotionStore::new();
    let csv = format!("{}{}{}", row("A", "1.00"), row("B", "3"), row("A", "2.00"));
    let summary = ingest(csv.as_bytes(), &store).unwrap();

    assert_eq!(summary.rows, 3);
    assert_eq!(summary.distinct_ids, 2);
    assert_eq!(summary.duplicates(), 1);
    assert_eq!(store.lookup("A").unwrap().price, 2.0);
}

#[test]
fn test_crlf_line_endings() {
    let csv = "P1,1.50,2025-01-01 00:00:00 +0000 UTC\r\nP2,2.50,2025-01-02 00:00:00 +0000 UTC\r\n";
    let promotions = parse_promotions(csv.as_bytes()).unwrap();

    assert_eq!(promotions.len(), 2);
    assert_eq!(promotions[1].id, "P2");
    assert_eq!(promotions[1].render().expiration_date, "2025-01-02 00:00:00");
}

#[test]
fn test_loose_quotes_are_tolerated() {
    let csv = "P\"1,1.00,2025-01-01 00:00:00 +0000 UTC\n\"P,2\",2.00,2025-01-01 00:00:00 +0000 UTC\n";
    let promotions = parse_promotions(csv.as_bytes()).unwrap();

    assert_eq!(promotions[0].id, "P\"1");
    assert_eq!(promotions[1].id, "P,2");
}

/// A bare quote inside a quoted field closes the quoted section; the rest of
/// the field is kept as unquoted text. The row loads rather than failing.
#[test]
fn test_stray_quote_inside_quoted_field() {
    let csv = "\"P\"1\",1.00,2025-01-01 00:00:00 +0000 UTC\n";
    let promotions = parse_promotions(csv.as_bytes()).unwrap();

    assert_eq!(promotions.len(), 1);
    assert_eq!(promotions[0].id, "P1\"");
    assert_eq!(promotions[0].price, 1.0);
}

#[test]
fn test_no_trailing_newline() {
    let csv = "P1,1.00,2025-01-01 00:00:00 +0000 UTC";
    assert_eq!(parse_promotions(csv.as_bytes()).unwrap().len(), 1);
}

// =============================================================================
// All-or-Nothing Tests
// =============================================================================

/// Regression: a failed upload used to leave the store empty because it was
/// cleared before parsing started.
#[test]
fn test_bad_price_on_row_five_keeps_previous_dataset() {
    let store = PromotionStore::new();
    ingest(SCENARIO.as_bytes(), &store).unwrap();
    let before = store.snapshot();

    let csv: String = ["N1", "N2", "N3", "N4"]
        .iter()
        .map(|id| row(id, "1.00"))
        .chain(std::iter::once(row("N5", "abc")))
        .chain(std::iter::once(row("N6", "2.00")))
        .collect();

    let err = ingest(csv.as_bytes(), &store).unwrap_err();
    match err {
        PromoError::FieldParse { line, field: FieldError::InvalidPrice { value, .. } } => {
            assert_eq!(line, 5);
            assert_eq!(value, "abc");
        }
        other => panic!("expected price parse error, got {:?}", other),
    }

    // Same snapshot, nothing from rows 1-4 leaked in
    assert!(std::sync::Arc::ptr_eq(&before, &store.snapshot()));
    assert_eq!(store.generation(), 1);
    assert!(store.lookup("P1").is_some());
    for id in ["N1", "N2", "N3", "N4", "N5", "N6"] {
        assert_eq!(store.lookup(id), None);
    }
}

#[test]
fn test_bad_expiration_reports_expiration_column() {
    let store = PromotionStore::new();
    let csv = "P1,1.00,2025-01-01 00:00:00 +0000 UTC\nP2,1.00,tomorrow\n";

    let err = ingest(csv.as_bytes(), &store).unwrap_err();
    assert!(matches!(
        err,
        PromoError::FieldParse { line: 2, field: FieldError::InvalidExpiration { .. } }
    ));
    assert!(store.is_empty());
    assert_eq!(store.generation(), 0);
}

#[test]
fn test_short_row_is_rejected() {
    let store = PromotionStore::new();
    let err = ingest("P1,1.00\n".as_bytes(), &store).unwrap_err();

    assert!(matches!(
        err,
        PromoError::FieldParse {
            line: 1,
            field: FieldError::ColumnCount { expected: 3, found: 2 }
        }
    ));
}

#[test]
fn test_negative_price_is_rejected() {
    let err = parse_promotions(row("P1", "-4.50").as_bytes()).unwrap_err();
    assert!(matches!(
        err,
        PromoError::FieldParse { field: FieldError::InvalidPrice { .. }, .. }
    ));
}

#[test]
fn test_stream_read_error_keeps_previous_dataset() {
    let store = PromotionStore::new();
    ingest(SCENARIO.as_bytes(), &store).unwrap();

    let reader = FailingReader {
        data: io::Cursor::new(row("N1", "1.00").into_bytes()),
    };
    let err = ingest(reader, &store).unwrap_err();

    assert!(matches!(err, PromoError::StreamRead { .. }));
    assert!(err.is_ingest_failure());
    assert_eq!(store.lookup("N1"), None);
    assert!(store.lookup("P2").is_some());
}

#[test]
fn test_invalid_utf8_is_a_read_error() {
    let data = b"P\xff1,1.00,2025-01-01 00:00:00 +0000 UTC\n".to_vec();
    let err = parse_promotions(data.as_slice()).unwrap_err();
    assert!(matches!(err, PromoError::StreamRead { .. }));
}
