//! File-backed engine tests
//!
//! Tests for the engine over `FileStore`:
//! - Visits and snapshots survive reopening the store
//! - Snapshot files are whole records
//! - Repair rebuilds snapshots from the logs on disk
//! - Concurrent writers to one entity all succeed

use std::fs;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use guest_metrics::{
    Amount, EngineConfig, FileStore, HistoryQuery, LineItem, MetricsEngine, MetricsSnapshot,
    NewVisit, VenueQuery, VisitStore,
};

static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

fn test_data_dir() -> std::path::PathBuf {
    let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    std::path::PathBuf::from(format!(
        "target/test_guest_metrics_{}_{}",
        std::process::id(),
        id
    ))
}

fn cleanup_dir(path: &std::path::Path) {
    let _ = fs::remove_dir_all(path);
}

fn dollars(value: f64) -> Amount {
    Amount::from_decimal(value).unwrap()
}

#[test]
fn test_visits_survive_reopen() {
    let data_dir = test_data_dir();

    {
        let engine = MetricsEngine::open(EngineConfig::new(&data_dir)).unwrap();
        engine
            .record_visit(
                "guest@example.com",
                NewVisit::new("Store A", dollars(18.5))
                    .with_date("2024-05-01")
                    .with_line_item(LineItem::new("Burger", 1, dollars(14.0)))
                    .with_line_item(LineItem::new("Soda", 2, dollars(2.25)))
                    .with_source_receipt("rcpt-001"),
            )
            .unwrap();
        engine
            .record_visit("guest@example.com", NewVisit::new("Store B", dollars(4.0)))
            .unwrap();
    }

    let engine = MetricsEngine::open(EngineConfig::new(&data_dir)).unwrap();

    let history = engine
        .get_history("guest@example.com", HistoryQuery::default())
        .unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].event.date, "2024-05-01");
    assert_eq!(history[0].event.line_items.len(), 2);
    assert_eq!(history[0].event.source_receipt_id.as_deref(), Some("rcpt-001"));

    let metrics = engine.get_metrics("guest@example.com").unwrap().unwrap();
    assert_eq!(metrics.total_visits, 2);
    assert_eq!(metrics.total_spent, dollars(22.5));
    assert_eq!(metrics.preferred_venue.as_deref(), Some("Store A"));

    cleanup_dir(&data_dir);
}

#[test]
fn test_snapshot_file_is_complete_json() {
    let data_dir = test_data_dir();
    let engine = MetricsEngine::open(EngineConfig::new(&data_dir)).unwrap();

    engine
        .record_visit("guest-1", NewVisit::new("Store A", dollars(9.99)))
        .unwrap();

    let path = data_dir.join("entities").join("guest-1").join("metrics.json");
    let content = fs::read_to_string(&path).unwrap();
    let snapshot: MetricsSnapshot = serde_json::from_str(&content).unwrap();
    assert_eq!(snapshot.total_visits, 1);
    assert!(content.contains("\"visitFrequencyPerMonth\""));
    assert!(!path.with_extension("tmp").exists());

    cleanup_dir(&data_dir);
}

#[test]
fn test_repair_rebuilds_deleted_snapshots() {
    let data_dir = test_data_dir();
    let engine = MetricsEngine::open(EngineConfig::new(&data_dir)).unwrap();

    for guest in ["alice", "bob", "carol"] {
        engine
            .record_visit(guest, NewVisit::new("Store A", dollars(5.0)))
            .unwrap();
    }

    // Simulate a lost snapshot
    fs::remove_file(data_dir.join("entities").join("bob").join("metrics.json")).unwrap();
    assert!(engine.get_metrics("bob").unwrap().is_none());

    let report = engine.recompute_all().unwrap();
    assert_eq!(report.recomputed, 3);
    assert!(report.is_clean());
    assert_eq!(engine.get_metrics("bob").unwrap().unwrap().total_visits, 1);

    cleanup_dir(&data_dir);
}

#[test]
fn test_venue_scan_over_files() {
    let data_dir = test_data_dir();
    let store = FileStore::open(&data_dir).unwrap();
    let engine = MetricsEngine::open(EngineConfig::new(&data_dir)).unwrap();

    for guest in ["g1", "g2", "g3"] {
        engine
            .record_visit(guest, NewVisit::new("Harbour", dollars(3.0)))
            .unwrap();
        engine
            .record_visit(guest, NewVisit::new("Airport", dollars(7.0)))
            .unwrap();
    }

    assert_eq!(store.entity_keys().unwrap(), vec!["g1", "g2", "g3"]);

    let visits = engine
        .get_venue_visits("Harbour", VenueQuery::default())
        .unwrap();
    assert_eq!(visits.len(), 3);
    assert!(visits.iter().all(|v| v.event.venue_id == "Harbour"));
    assert!(visits
        .windows(2)
        .all(|w| w[0].event.recorded_at >= w[1].event.recorded_at));

    cleanup_dir(&data_dir);
}

#[test]
fn test_concurrent_writers_to_one_entity() {
    let data_dir = test_data_dir();
    let engine = Arc::new(MetricsEngine::open(EngineConfig::new(&data_dir)).unwrap());
    let mut handles = vec![];

    for _ in 0..4 {
        let engine = Arc::clone(&engine);
        handles.push(thread::spawn(move || {
            for _ in 0..25 {
                engine
                    .record_visit("guest-1", NewVisit::new("Store A", dollars(2.0)))
                    .unwrap();
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    let history = engine
        .get_history("guest-1", HistoryQuery::default().with_limit(100))
        .unwrap();
    assert_eq!(history.len(), 100);
    assert!(history
        .windows(2)
        .all(|w| w[1].recorded_at() > w[0].recorded_at()));

    let metrics = engine.recompute("guest-1").unwrap();
    assert_eq!(metrics.total_visits, 100);
    assert_eq!(metrics.total_spent, dollars(200.0));

    // No snapshot temp files left next to the log
    let leftovers = fs::read_dir(data_dir.join("entities").join("guest-1"))
        .unwrap()
        .filter(|entry| {
            let name = entry.as_ref().unwrap().file_name();
            name.to_string_lossy().ends_with(".tmp")
        })
        .count();
    assert_eq!(leftovers, 0);

    cleanup_dir(&data_dir);
}
