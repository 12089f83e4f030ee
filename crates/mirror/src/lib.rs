//! Relational mirror of the land-registry ledger
//!
//! The ledger is the source of truth; this crate maintains a best-effort,
//! eventually-consistent Postgres cache of it. Three tables mirror the three
//! ledger entity kinds, the reconciliation engine repairs never-initialized
//! or wiped tables from bulk ledger reads, and the approval aggregator
//! applies per-role approvals with before/after ownership diffing.
//!
//! Mirror tables are written exclusively through the reconciliation engine
//! and the approval aggregator; the HTTP layer never touches them directly.

pub mod approval;
pub mod error;
pub mod outcome;
pub mod reconcile;
pub mod records;
pub mod store;

pub use approval::{ApprovalCoordinator, ApprovalReceipt, TransferStore};
pub use error::{MirrorError, MirrorResult};
pub use outcome::Outcome;
pub use reconcile::{
    ensure_synced, MirrorTable, ReconcileStore, Reconciler, SyncOutcome, SyncReport, TableSnapshot,
};
pub use records::{LandParcelRecord, PlotRecord, TransferRequestRecord};
pub use store::{MirrorDb, MirrorStore, TableKind};
