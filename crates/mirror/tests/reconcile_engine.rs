//! Reconciliation engine behavior against a fake table.

mod common;

use common::FakeTable;
use landchain_mirror::{ensure_synced, SyncOutcome, SyncReport};
use std::sync::atomic::Ordering;

#[tokio::test]
async fn absent_table_is_created_and_populated() {
    let table = FakeTable::new(false, 0);

    let outcome = ensure_synced(&table).await.unwrap();

    assert_eq!(
        outcome,
        SyncOutcome::Created(SyncReport { synced: 3, skipped: 1 })
    );
    assert_eq!(table.schema_calls.load(Ordering::SeqCst), 1);
    assert_eq!(table.resync_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn empty_table_is_repopulated() {
    let table = FakeTable::new(true, 0);

    let outcome = ensure_synced(&table).await.unwrap();

    assert_eq!(
        outcome,
        SyncOutcome::Repopulated(SyncReport { synced: 3, skipped: 1 })
    );
    assert_eq!(table.resync_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn populated_table_is_left_alone() {
    let table = FakeTable::new(true, 42);

    let outcome = ensure_synced(&table).await.unwrap();

    assert_eq!(outcome, SyncOutcome::AlreadyPopulated { rows: 42 });
    assert_eq!(table.resync_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn sync_is_idempotent_after_creation() {
    let table = FakeTable::new(false, 0);

    let first = ensure_synced(&table).await.unwrap();
    let second = ensure_synced(&table).await.unwrap();

    assert!(matches!(first, SyncOutcome::Created(_)));
    assert_eq!(second, SyncOutcome::AlreadyPopulated { rows: 3 });
    // Only the first pass resynced
    assert_eq!(table.resync_calls.load(Ordering::SeqCst), 1);
}
