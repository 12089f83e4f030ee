//! Three-party approval workflow against in-memory ledger and store fakes.

mod common;

use common::{FakeLedger, MemoryStore, HOLDER, RECIPIENT, SIGNER};
use landchain_ledger::RequestStatus;
use landchain_mirror::{ApprovalCoordinator, MirrorError};
use std::sync::atomic::Ordering;
use std::sync::Arc;

fn coordinator() -> (Arc<FakeLedger>, Arc<MemoryStore>, ApprovalCoordinator) {
    let ledger = Arc::new(FakeLedger::with_pending_transfer());
    let store = Arc::new(MemoryStore::with_pending_transfer());
    let coordinator = ApprovalCoordinator::new(ledger.clone(), store.clone());
    (ledger, store, coordinator)
}

#[tokio::test]
async fn three_approvals_complete_and_update_holder() {
    let (_ledger, store, coordinator) = coordinator();

    let first = coordinator.approve(1, SIGNER, 1).await.unwrap();
    assert!(first.is_complete());
    let request = first.value().request.as_ref().unwrap();
    assert_eq!(request.current_status, RequestStatus::InProgress);
    assert!(!first.value().holder_updated);

    let second = coordinator.approve(1, SIGNER, 2).await.unwrap();
    assert_eq!(
        second.value().request.as_ref().unwrap().current_status,
        RequestStatus::InProgress
    );

    let third = coordinator.approve(1, SIGNER, 3).await.unwrap();
    assert!(third.is_complete());
    let request = third.value().request.as_ref().unwrap();
    assert_eq!(request.current_status, RequestStatus::Completed);
    assert!(request.all_approved());
    assert!(third.value().holder_updated);

    let plot = store.plots.lock().unwrap().get(&1).cloned().unwrap();
    assert_eq!(plot.current_holder, RECIPIENT);
}

#[tokio::test]
async fn incomplete_approval_leaves_holder_untouched() {
    let (_ledger, store, coordinator) = coordinator();

    let outcome = coordinator.approve(1, SIGNER, 2).await.unwrap();
    assert!(!outcome.value().holder_updated);

    let plot = store.plots.lock().unwrap().get(&1).cloned().unwrap();
    assert_eq!(plot.current_holder, HOLDER);
}

#[tokio::test]
async fn approvals_are_monotonic() {
    let (_ledger, store, coordinator) = coordinator();

    coordinator.approve(1, SIGNER, 1).await.unwrap();
    // Re-approving the same role must not clear anything
    let again = coordinator.approve(1, SIGNER, 1).await.unwrap();
    let request = again.value().request.as_ref().unwrap();
    assert!(request.land_authority_approved);
    assert_eq!(request.current_status, RequestStatus::InProgress);

    let stored = store.requests.lock().unwrap().get(&1).cloned().unwrap();
    assert!(stored.land_authority_approved);
    assert!(!stored.bank_approved);
}

#[tokio::test]
async fn ledger_failure_leaves_mirror_untouched() {
    let (ledger, store, coordinator) = coordinator();
    ledger.fail_writes.store(true, Ordering::SeqCst);

    let err = coordinator.approve(1, SIGNER, 1).await.unwrap_err();
    assert!(matches!(err, MirrorError::Ledger(_)));

    let stored = store.requests.lock().unwrap().get(&1).cloned().unwrap();
    assert!(!stored.land_authority_approved);
    assert_eq!(stored.current_status, RequestStatus::Pending);
}

#[tokio::test]
async fn mirror_write_failure_degrades_but_succeeds() {
    let (ledger, store, coordinator) = coordinator();
    store.fail_apply.store(true, Ordering::SeqCst);

    let outcome = coordinator.approve(1, SIGNER, 1).await.unwrap();
    assert!(!outcome.is_complete());
    assert!(outcome.warning().unwrap().contains("request not updated"));
    // The ledger transaction went through regardless
    assert_eq!(ledger.write_count.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn holder_update_failure_degrades_completed_approval() {
    let (_ledger, store, coordinator) = coordinator();
    coordinator.approve(1, SIGNER, 1).await.unwrap();
    coordinator.approve(1, SIGNER, 2).await.unwrap();

    store.fail_update_holder.store(true, Ordering::SeqCst);
    let third = coordinator.approve(1, SIGNER, 3).await.unwrap();

    assert!(!third.is_complete());
    assert!(third.warning().unwrap().contains("holder not updated"));
    // Request row still completed
    assert_eq!(
        third.value().request.as_ref().unwrap().current_status,
        RequestStatus::Completed
    );
    // Mirror holder stale until the next resync
    let plot = store.plots.lock().unwrap().get(&1).cloned().unwrap();
    assert_eq!(plot.current_holder, HOLDER);
}

#[tokio::test]
async fn failed_prior_snapshot_skips_holder_sync() {
    let (ledger, store, coordinator) = coordinator();
    coordinator.approve(1, SIGNER, 1).await.unwrap();
    coordinator.approve(1, SIGNER, 2).await.unwrap();

    // Fail the pre-approval plot read for the completing approval; without a
    // snapshot there is no diff basis and the mirror row must stay put.
    ledger.fail_plot_reads.store(1, Ordering::SeqCst);
    let third = coordinator.approve(1, SIGNER, 3).await.unwrap();

    assert!(!third.value().holder_updated);
    assert_eq!(
        third.value().request.as_ref().unwrap().current_status,
        RequestStatus::Completed
    );
    // The chain executed the transfer; the mirror waits for the next resync
    let plot = store.plots.lock().unwrap().get(&1).cloned().unwrap();
    assert_eq!(plot.current_holder, HOLDER);
}

#[tokio::test]
async fn invalid_inputs_are_rejected_before_submission() {
    let (ledger, _store, coordinator) = coordinator();

    let err = coordinator.approve(1, SIGNER, 0).await.unwrap_err();
    assert!(matches!(err, MirrorError::InvalidInput { .. }));

    let err = coordinator.approve(1, "not-an-address", 1).await.unwrap_err();
    assert!(matches!(err, MirrorError::InvalidInput { .. }));

    let err = coordinator.approve(0, SIGNER, 1).await.unwrap_err();
    assert!(matches!(err, MirrorError::InvalidInput { .. }));

    let err = coordinator.approve(99, SIGNER, 1).await.unwrap_err();
    assert!(matches!(err, MirrorError::NotFound { .. }));

    assert_eq!(ledger.write_count.load(Ordering::SeqCst), 0);
}
