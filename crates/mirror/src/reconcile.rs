//! Reconciliation engine
//!
//! Repairs mirror tables from bulk ledger reads. A table that is absent or
//! empty is (re)built from a full enumeration of the ledger; a populated
//! table is left untouched. Bulk ledger reads do not expose native ids, so
//! resync assigns positional ids: 1-based enumeration order, with malformed
//! entries skipped but their position still consumed so later ids stay
//! aligned with the ledger.

use async_trait::async_trait;
use landchain_ledger::{LandInfo, Ledger, PlotInfo, TransferRequestInfo, TxReceipt};
use landchain_ledger::RequestStatus;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{MirrorError, MirrorResult};
use crate::outcome::Outcome;
use crate::records::{LandParcelRecord, PlotRecord, TransferRequestRecord};
use crate::store::{LandTable, MirrorStore, PlotTable, RequestTable, TableKind};

/// Tally of one resync pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncReport {
    /// Rows written to the mirror
    pub synced: u64,
    /// Ledger entries skipped as malformed (their positional ids were
    /// still consumed)
    pub skipped: u64,
}

/// What `ensure_synced` did to a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Table was absent; created and populated
    Created(SyncReport),
    /// Table existed but held no rows; repopulated
    Repopulated(SyncReport),
    /// Table already held rows; nothing touched
    AlreadyPopulated { rows: u64 },
}

/// One mirror table as seen by the reconciliation engine.
#[async_trait]
pub trait MirrorTable: Send + Sync {
    fn kind(&self) -> TableKind;
    async fn exists(&self) -> MirrorResult<bool>;
    async fn ensure_schema(&self) -> MirrorResult<()>;
    async fn row_count(&self) -> MirrorResult<u64>;
    /// Rebuild the table contents from a full ledger enumeration.
    async fn resync(&self) -> MirrorResult<SyncReport>;
}

/// Bring a table in line with the ledger: create it if absent, repopulate
/// it if empty, leave it alone otherwise.
pub async fn ensure_synced<T: MirrorTable + ?Sized>(table: &T) -> MirrorResult<SyncOutcome> {
    let existed = table.exists().await?;
    // For the plot table this may also drop and recreate a drifted schema,
    // which empties it; the row count below observes that.
    table.ensure_schema().await?;

    if !existed {
        let report = table.resync().await?;
        info!(
            "Created and populated '{}': {} synced, {} skipped",
            table.kind().table_name(),
            report.synced,
            report.skipped
        );
        return Ok(SyncOutcome::Created(report));
    }

    let rows = table.row_count().await?;
    if rows == 0 {
        let report = table.resync().await?;
        info!(
            "Repopulated empty '{}': {} synced, {} skipped",
            table.kind().table_name(),
            report.synced,
            report.skipped
        );
        return Ok(SyncOutcome::Repopulated(report));
    }

    Ok(SyncOutcome::AlreadyPopulated { rows })
}

// ===== Positional converters =====
//
// Pure functions from bulk ledger reads to mirror rows. Kept free of any
// database handle so the id-assignment and skip rules are unit-testable.

/// Convert a bulk land read to rows. Entries with an empty block or parcel
/// name are skipped; their position still consumes a token id.
pub fn lands_to_records(lands: &[LandInfo]) -> (Vec<LandParcelRecord>, u64) {
    let mut records = Vec::with_capacity(lands.len());
    let mut skipped = 0u64;
    for (idx, land) in lands.iter().enumerate() {
        let token_id = idx as i64 + 1;
        if land.block_name.is_empty() || land.parcel_name.is_empty() {
            warn!("Skipping malformed land entry at token id {}", token_id);
            skipped += 1;
            continue;
        }
        records.push(LandParcelRecord {
            token_id,
            parcel_name: land.parcel_name.clone(),
            block_name: land.block_name.clone(),
            total_supply: land.total_supply.clone(),
            metadata_uri: land.metadata_uri.clone(),
        });
    }
    (records, skipped)
}

/// Convert a bulk plot read to rows. A plot with an empty name or owner, or
/// with no valid parcel pairs, is skipped; its position still consumes a
/// plot id. Within a plot, only id/amount pairs where the id parses to a
/// positive integer and the amount to a non-negative one are kept.
pub fn plots_to_records(plots: &[PlotInfo]) -> (Vec<PlotRecord>, u64) {
    let mut records = Vec::with_capacity(plots.len());
    let mut skipped = 0u64;
    for (idx, plot) in plots.iter().enumerate() {
        let plot_id = idx as i64 + 1;
        if plot.plot_name.is_empty() || plot.plot_owner.is_empty() {
            warn!("Skipping malformed plot entry at plot id {}", plot_id);
            skipped += 1;
            continue;
        }

        let mut parcel_ids = Vec::new();
        let mut parcel_amounts = Vec::new();
        for (id_str, amount_str) in plot.parcel_ids.iter().zip(plot.parcel_amounts.iter()) {
            match (id_str.parse::<i64>(), amount_str.parse::<i64>()) {
                (Ok(id), Ok(amount)) if id > 0 && amount >= 0 => {
                    parcel_ids.push(id);
                    parcel_amounts.push(amount);
                }
                _ => {
                    warn!(
                        "Dropping unparseable parcel pair ({}, {}) in plot {}",
                        id_str, amount_str, plot_id
                    );
                }
            }
        }
        if parcel_ids.is_empty() {
            warn!("Skipping plot {} with no valid parcel pairs", plot_id);
            skipped += 1;
            continue;
        }

        records.push(PlotRecord {
            plot_id,
            plot_name: plot.plot_name.clone(),
            current_holder: plot.plot_owner.clone(),
            parcel_ids,
            parcel_amounts,
        });
    }
    (records, skipped)
}

/// Convert a bulk transfer-request read to rows. A request whose plot id
/// does not parse is skipped; its position still consumes a request id.
pub fn requests_to_records(
    requests: &[TransferRequestInfo],
) -> (Vec<TransferRequestRecord>, u64) {
    let mut records = Vec::with_capacity(requests.len());
    let mut skipped = 0u64;
    for (idx, request) in requests.iter().enumerate() {
        let request_id = idx as i64 + 1;
        let plot_id = match request.plot_id.parse::<i64>() {
            Ok(id) if id > 0 => id,
            _ => {
                warn!(
                    "Skipping request {} with unparseable plot id '{}'",
                    request_id, request.plot_id
                );
                skipped += 1;
                continue;
            }
        };
        records.push(TransferRequestRecord {
            request_id,
            plot_id,
            is_plot_transfer: request.is_plot_transfer,
            land_authority_approved: request.land_authority_approved,
            lawyer_approved: request.lawyer_approved,
            bank_approved: request.bank_approved,
            current_status: RequestStatus::from_approvals(
                request.land_authority_approved,
                request.bank_approved,
                request.lawyer_approved,
            ),
        });
    }
    (records, skipped)
}

// ===== MirrorTable implementations =====

#[async_trait]
impl MirrorTable for LandTable {
    fn kind(&self) -> TableKind {
        TableKind::Land
    }

    async fn exists(&self) -> MirrorResult<bool> {
        LandTable::exists(self).await
    }

    async fn ensure_schema(&self) -> MirrorResult<()> {
        LandTable::ensure_schema(self).await
    }

    async fn row_count(&self) -> MirrorResult<u64> {
        LandTable::row_count(self).await
    }

    async fn resync(&self) -> MirrorResult<SyncReport> {
        let lands = self.ledger.get_all_land_info().await?;
        let (records, skipped) = lands_to_records(&lands);
        self.upsert_from_ledger(&records).await?;
        Ok(SyncReport {
            synced: records.len() as u64,
            skipped,
        })
    }
}

#[async_trait]
impl MirrorTable for PlotTable {
    fn kind(&self) -> TableKind {
        TableKind::Plot
    }

    async fn exists(&self) -> MirrorResult<bool> {
        PlotTable::exists(self).await
    }

    async fn ensure_schema(&self) -> MirrorResult<()> {
        PlotTable::ensure_schema(self).await
    }

    async fn row_count(&self) -> MirrorResult<u64> {
        PlotTable::row_count(self).await
    }

    async fn resync(&self) -> MirrorResult<SyncReport> {
        let plots = self.ledger.get_all_plot_info().await?;
        let (records, skipped) = plots_to_records(&plots);
        self.upsert_from_ledger(&records).await?;
        Ok(SyncReport {
            synced: records.len() as u64,
            skipped,
        })
    }
}

#[async_trait]
impl MirrorTable for RequestTable {
    fn kind(&self) -> TableKind {
        TableKind::Request
    }

    async fn exists(&self) -> MirrorResult<bool> {
        RequestTable::exists(self).await
    }

    async fn ensure_schema(&self) -> MirrorResult<()> {
        RequestTable::ensure_schema(self).await
    }

    async fn row_count(&self) -> MirrorResult<u64> {
        RequestTable::row_count(self).await
    }

    async fn resync(&self) -> MirrorResult<SyncReport> {
        let requests = self.ledger.get_all_transfer_requests().await?;
        let (records, skipped) = requests_to_records(&requests);
        self.upsert_from_ledger(&records).await?;
        Ok(SyncReport {
            synced: records.len() as u64,
            skipped,
        })
    }
}

/// Snapshot of one mirror table after a sync check.
#[derive(Debug, Clone)]
pub struct TableSnapshot {
    pub sync: SyncOutcome,
    pub rows: Vec<Value>,
}

/// Mirror-side operations the reconciler facade needs. Split out as a trait
/// so the write-through and degradation logic is testable against an
/// in-memory store, mirroring the `TransferStore` seam of the approval
/// aggregator.
#[async_trait]
pub trait ReconcileStore: Send + Sync {
    async fn sync(&self, kind: TableKind) -> MirrorResult<SyncOutcome>;
    async fn insert_land(&self, record: &LandParcelRecord) -> MirrorResult<LandParcelRecord>;
    async fn insert_plot(&self, record: &PlotRecord) -> MirrorResult<PlotRecord>;
    async fn insert_request(
        &self,
        record: &TransferRequestRecord,
    ) -> MirrorResult<Option<TransferRequestRecord>>;
    async fn find_plot(&self, plot_id: i64) -> MirrorResult<Option<PlotRecord>>;
    async fn find_plot_by_name(&self, plot_name: &str) -> MirrorResult<Option<PlotRecord>>;
    async fn find_land_by_names(
        &self,
        block_name: &str,
        parcel_name: &str,
    ) -> MirrorResult<Option<LandParcelRecord>>;
    async fn fetch_rows(&self, kind: TableKind) -> MirrorResult<Vec<Value>>;
    async fn drop_table(&self, kind: TableKind) -> MirrorResult<bool>;
}

#[async_trait]
impl ReconcileStore for MirrorStore {
    async fn sync(&self, kind: TableKind) -> MirrorResult<SyncOutcome> {
        match kind {
            TableKind::Land => ensure_synced(&self.land).await,
            TableKind::Plot => ensure_synced(&self.plots).await,
            TableKind::Request => ensure_synced(&self.requests).await,
        }
    }

    async fn insert_land(&self, record: &LandParcelRecord) -> MirrorResult<LandParcelRecord> {
        self.land.insert_one(record).await
    }

    async fn insert_plot(&self, record: &PlotRecord) -> MirrorResult<PlotRecord> {
        self.plots.insert_one(record).await
    }

    async fn insert_request(
        &self,
        record: &TransferRequestRecord,
    ) -> MirrorResult<Option<TransferRequestRecord>> {
        self.requests.insert_one(record).await
    }

    async fn find_plot(&self, plot_id: i64) -> MirrorResult<Option<PlotRecord>> {
        self.plots.find(plot_id).await
    }

    async fn find_plot_by_name(&self, plot_name: &str) -> MirrorResult<Option<PlotRecord>> {
        self.plots.find_by_name(plot_name).await
    }

    async fn find_land_by_names(
        &self,
        block_name: &str,
        parcel_name: &str,
    ) -> MirrorResult<Option<LandParcelRecord>> {
        self.land.find_by_names(block_name, parcel_name).await
    }

    async fn fetch_rows(&self, kind: TableKind) -> MirrorResult<Vec<Value>> {
        match kind {
            TableKind::Land => to_json_rows(self.land.fetch_all().await?),
            TableKind::Plot => to_json_rows(self.plots.fetch_all().await?),
            TableKind::Request => to_json_rows(self.requests.fetch_all().await?),
        }
    }

    async fn drop_table(&self, kind: TableKind) -> MirrorResult<bool> {
        match kind {
            TableKind::Land => self.land.drop_table().await,
            TableKind::Plot => self.plots.drop_table().await,
            TableKind::Request => self.requests.drop_table().await,
        }
    }
}

/// Facade over the mirror store. All mirror writes go through here (or the
/// approval aggregator); ledger write-through failures degrade instead of
/// erroring because the chain mutation already confirmed.
#[derive(Clone)]
pub struct Reconciler {
    store: Arc<dyn ReconcileStore>,
    ledger: Arc<dyn Ledger>,
}

impl Reconciler {
    pub fn new(store: Arc<dyn ReconcileStore>, ledger: Arc<dyn Ledger>) -> Self {
        Self { store, ledger }
    }

    /// Ensure one table is in sync with the ledger.
    pub async fn ensure_synced(&self, kind: TableKind) -> MirrorResult<SyncOutcome> {
        self.store.sync(kind).await
    }

    /// Sync a table and return its rows as JSON values.
    pub async fn fetch_table(&self, kind: TableKind) -> MirrorResult<TableSnapshot> {
        let sync = self.store.sync(kind).await?;
        let rows = self.store.fetch_rows(kind).await?;
        Ok(TableSnapshot { sync, rows })
    }

    /// Drop a mirror table. Returns false when it did not exist. The next
    /// sync rebuilds it from the ledger.
    pub async fn drop_table(&self, kind: TableKind) -> MirrorResult<bool> {
        self.store.drop_table(kind).await
    }

    /// Mirrored plot lookup by unique name, syncing the table first.
    pub async fn find_plot_by_name(&self, plot_name: &str) -> MirrorResult<Option<PlotRecord>> {
        self.store.sync(TableKind::Plot).await?;
        self.store.find_plot_by_name(plot_name).await
    }

    /// Mirrored land lookup by block and parcel names, syncing first.
    pub async fn find_land_by_names(
        &self,
        block_name: &str,
        parcel_name: &str,
    ) -> MirrorResult<Option<LandParcelRecord>> {
        self.store.sync(TableKind::Land).await?;
        self.store.find_land_by_names(block_name, parcel_name).await
    }

    /// Mirror a token whose creation just confirmed on the ledger.
    ///
    /// The token id comes from the confirmed receipt's event, never from a
    /// pre-submission counter read. Mirror failures degrade: the ledger
    /// already holds the token, so the caller still gets a success.
    pub async fn record_token(
        &self,
        receipt: &TxReceipt,
        block_name: &str,
        parcel_name: &str,
        metadata_uri: &str,
        total_supply: &str,
    ) -> Outcome<Option<LandParcelRecord>> {
        let token_id = match receipt.token_id() {
            Some(id) => id as i64,
            None => {
                return Outcome::Degraded {
                    value: None,
                    warning: "Confirmed receipt carried no token id; mirror row not written"
                        .to_string(),
                }
            }
        };

        if let Err(e) = self.ensure_synced(TableKind::Land).await {
            return degrade_sync(TableKind::Land, e);
        }

        let record = LandParcelRecord {
            token_id,
            parcel_name: parcel_name.to_string(),
            block_name: block_name.to_string(),
            total_supply: total_supply.to_string(),
            metadata_uri: metadata_uri.to_string(),
        };

        match self.store.insert_land(&record).await {
            Ok(row) => Outcome::Complete(Some(row)),
            Err(MirrorError::DuplicateKey { .. }) => {
                // Resync already wrote this row
                Outcome::Complete(Some(record))
            }
            Err(e) => degrade_write(TableKind::Land, token_id, e),
        }
    }

    /// Mirror a plot whose initiation just confirmed on the ledger.
    ///
    /// The authoritative row contents are re-read from the ledger by the
    /// receipt's plot id rather than echoed from caller input.
    pub async fn record_plot(&self, receipt: &TxReceipt) -> Outcome<Option<PlotRecord>> {
        let plot_id = match receipt.plot_id() {
            Some(id) => id,
            None => {
                return Outcome::Degraded {
                    value: None,
                    warning: "Confirmed receipt carried no plot id; mirror row not written"
                        .to_string(),
                }
            }
        };

        let info = match self.ledger.get_plot_info(plot_id).await {
            Ok(info) => info,
            Err(e) => {
                return Outcome::Degraded {
                    value: None,
                    warning: format!("Plot {} confirmed but read-back failed: {}", plot_id, e),
                }
            }
        };

        if let Err(e) = self.ensure_synced(TableKind::Plot).await {
            return degrade_sync(TableKind::Plot, e);
        }

        let (records, _) = plots_to_records(std::slice::from_ref(&info));
        let mut record = match records.into_iter().next() {
            Some(record) => record,
            None => {
                return Outcome::Degraded {
                    value: None,
                    warning: format!(
                        "Plot {} confirmed but ledger returned a malformed entry",
                        plot_id
                    ),
                }
            }
        };
        record.plot_id = plot_id as i64;

        match self.store.insert_plot(&record).await {
            Ok(row) => Outcome::Complete(Some(row)),
            Err(MirrorError::DuplicateKey { .. }) => Outcome::Complete(Some(record)),
            Err(e) => degrade_write(TableKind::Plot, plot_id as i64, e),
        }
    }

    /// Mirror a transfer request whose creation just confirmed.
    ///
    /// Duplicate request ids are swallowed by the store; the outcome is
    /// still complete because the row is already mirrored.
    pub async fn record_request(
        &self,
        receipt: &TxReceipt,
        plot_id: u64,
        is_plot_transfer: bool,
    ) -> Outcome<Option<TransferRequestRecord>> {
        let request_id = match receipt.request_id() {
            Some(id) => id as i64,
            None => {
                return Outcome::Degraded {
                    value: None,
                    warning: "Confirmed receipt carried no request id; mirror row not written"
                        .to_string(),
                }
            }
        };

        if let Err(e) = self.ensure_synced(TableKind::Request).await {
            return degrade_sync(TableKind::Request, e);
        }

        // A request row must never exist without its plot row.
        if let Err(e) = self.ensure_synced(TableKind::Plot).await {
            return degrade_sync(TableKind::Plot, e);
        }
        match self.store.find_plot(plot_id as i64).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                warn!(
                    "Request {} confirmed but plot {} has no mirror row; request row not written",
                    request_id, plot_id
                );
                return Outcome::Degraded {
                    value: None,
                    warning: format!(
                        "Plot {} has no mirror row; request {} not mirrored",
                        plot_id, request_id
                    ),
                };
            }
            Err(e) => return degrade_write(TableKind::Request, request_id, e),
        }

        let record = TransferRequestRecord::new(request_id, plot_id as i64, is_plot_transfer);
        match self.store.insert_request(&record).await {
            Ok(row) => Outcome::Complete(row),
            Err(e) => degrade_write(TableKind::Request, request_id, e),
        }
    }
}

fn degrade_sync<T>(kind: TableKind, e: MirrorError) -> Outcome<Option<T>> {
    warn!("Mirror sync of '{}' failed: {}", kind.table_name(), e);
    Outcome::Degraded {
        value: None,
        warning: format!("Mirror sync of {} failed: {}", kind.table_name(), e),
    }
}

fn degrade_write<T>(kind: TableKind, id: i64, e: MirrorError) -> Outcome<Option<T>> {
    warn!(
        "Mirror write of id {} to '{}' failed: {}",
        id,
        kind.table_name(),
        e
    );
    Outcome::Degraded {
        value: None,
        warning: format!("Mirror write of {} row {} failed: {}", kind.table_name(), id, e),
    }
}

fn to_json_rows<T: serde::Serialize>(rows: Vec<T>) -> MirrorResult<Vec<Value>> {
    rows.into_iter()
        .map(|row| {
            serde_json::to_value(row).map_err(|e| {
                MirrorError::invalid_input("row", format!("serialization failed: {}", e))
            })
        })
        .collect()
}
