//! Shared application state

use landchain_ledger::Ledger;
use landchain_mirror::{ApprovalCoordinator, MirrorDb, MirrorStore, Reconciler};
use std::sync::Arc;

/// Handles shared across all request handlers. Everything inside is cheaply
/// cloneable; the ledger client and the store are injected once at startup.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<dyn Ledger>,
    pub reconciler: Reconciler,
    pub coordinator: ApprovalCoordinator,
}

impl AppState {
    pub fn new(ledger: Arc<dyn Ledger>, db: MirrorDb) -> Self {
        let store = MirrorStore::new(db, ledger.clone());
        let reconciler = Reconciler::new(Arc::new(store.clone()), ledger.clone());
        let coordinator = ApprovalCoordinator::new(ledger.clone(), Arc::new(store));
        Self {
            ledger,
            reconciler,
            coordinator,
        }
    }
}
