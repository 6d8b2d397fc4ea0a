//! Tests for Engine
//!
//! These tests verify:
//! - Lookup rendering and not-found handling
//! - Upload routing and size limits
//! - Command execution
//! - Concurrent lookups during uploads

use std::sync::Arc;
use std::thread;

use promokv::config::Config;
use promokv::engine::{Engine, UPLOAD_OK};
use promokv::protocol::Command;
use promokv::{PromoError, PromotionView, StoreStats};

// =============================================================================
// Helper Functions
// =============================================================================

const SCENARIO: &[u8] = b"P1,19.99,2025-01-01 00:00:00 +0000 UTC\n\
                          P2,5,2025-06-15 23:59:59 +0000 UTC\n";

fn setup_engine() -> Engine {
    Engine::new(Config::default()).unwrap()
}

fn setup_engine_with_upload_limit(limit: usize) -> Engine {
    let config = Config::builder().max_upload_bytes(limit).build();
    Engine::new(config).unwrap()
}

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_engine_rejects_invalid_config() {
    let config = Config::builder().worker_threads(0).build();
    assert!(matches!(Engine::new(config), Err(PromoError::Config(_))));
}

#[test]
fn test_engine_starts_empty() {
    let engine = setup_engine();
    assert!(matches!(engine.lookup("P1"), Err(PromoError::NotFound)));
    assert_eq!(engine.stats().generation, 0);
}

#[test]
fn test_engine_upload_and_lookup() {
    let engine = setup_engine();
    let summary = engine.upload(SCENARIO).unwrap();
    assert_eq!(summary.rows, 2);

    let view = engine.lookup("P2").unwrap();
    assert_eq!(
        view,
        PromotionView {
            id: "P2".to_string(),
            price: "5.00".to_string(),
            expiration_date: "2025-06-15 23:59:59".to_string(),
        }
    );
    assert_eq!(engine.find("P1").unwrap().price, 19.99);
}

#[test]
fn test_engine_failed_upload_keeps_dataset() {
    let engine = setup_engine();
    engine.upload(SCENARIO).unwrap();

    let err = engine.upload(b"X1,oops,2025-01-01 00:00:00 +0000 UTC\n").unwrap_err();
    assert!(err.is_ingest_failure());

    assert_eq!(engine.lookup("P1").unwrap().price, "19.99");
    assert!(matches!(engine.lookup("X1"), Err(PromoError::NotFound)));
}

#[test]
fn test_engine_rejects_oversized_upload() {
    let engine = setup_engine_with_upload_limit(16);
    engine.upload(b"A,1,2025-01-01 00:00:00 +0000 UTC").unwrap_err();

    let err = engine.upload(SCENARIO).unwrap_err();
    assert!(matches!(err, PromoError::UploadTooLarge { limit: 16, .. }));
    assert_eq!(engine.stats().generation, 0);
}

#[test]
fn test_engine_ingest_stream_respects_limit() {
    let engine = setup_engine_with_upload_limit(SCENARIO.len());
    engine.ingest(SCENARIO).unwrap();

    let mut bigger = SCENARIO.to_vec();
    bigger.extend_from_slice(b"P3,1,2025-01-01 00:00:00 +0000 UTC\n");
    let err = engine.ingest(bigger.as_slice()).unwrap_err();

    assert!(matches!(err, PromoError::UploadTooLarge { .. }));
    assert!(engine.find("P3").is_none());
    assert_eq!(engine.stats().generation, 1);
}

// =============================================================================
// Command Execution Tests
// =============================================================================

#[test]
fn test_execute_ping() {
    let engine = setup_engine();
    let result = engine.execute(Command::Ping).unwrap();
    assert_eq!(result, Some(b"PONG".to_vec()));
}

#[test]
fn test_execute_upload_and_lookup() {
    let engine = setup_engine();

    let reply = engine
        .execute(Command::Upload { data: SCENARIO.to_vec() })
        .unwrap();
    assert_eq!(reply, Some(UPLOAD_OK.to_vec()));

    let payload = engine
        .execute(Command::Lookup { id: "P1".to_string() })
        .unwrap()
        .unwrap();
    let view: PromotionView = bincode::deserialize(&payload).unwrap();
    assert_eq!(view.price, "19.99");
    assert_eq!(view.expiration_date, "2025-01-01 00:00:00");
}

#[test]
fn test_execute_lookup_missing() {
    let engine = setup_engine();
    let result = engine.execute(Command::Lookup { id: "nope".to_string() });
    assert!(matches!(result, Err(PromoError::NotFound)));
}

#[test]
fn test_execute_stats() {
    let engine = setup_engine();
    engine.upload(SCENARIO).unwrap();

    let payload = engine.execute(Command::Stats).unwrap().unwrap();
    let stats: StoreStats = bincode::deserialize(&payload).unwrap();
    assert_eq!(stats.records, 2);
    assert_eq!(stats.distinct_ids, 2);
    assert_eq!(stats.generation, 1);
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_lookups_during_uploads() {
    let engine = Arc::new(setup_engine());
    engine.upload(SCENARIO).unwrap();

    let mut handles = vec![];
    for _ in 0..4 {
        let engine_clone = Arc::clone(&engine);
        handles.push(thread::spawn(move || {
            for _ in 0..500 {
                let view = engine_clone.lookup("P1").unwrap();
                assert_eq!(view.id, "P1");
                assert!(view.price == "19.99" || view.price == "20.00");
            }
        }));
    }

    let uploader = {
        let engine_clone = Arc::clone(&engine);
        thread::spawn(move || {
            for i in 0..50 {
                let csv: &[u8] = if i % 2 == 0 {
                    b"P1,20,2025-01-01 00:00:00 +0000 UTC\n"
                } else {
                    SCENARIO
                };
                engine_clone.upload(csv).unwrap();
            }
        })
    };

    for handle in handles {
        handle.join().unwrap();
    }
    uploader.join().unwrap();

    assert_eq!(engine.stats().generation, 51);
}
