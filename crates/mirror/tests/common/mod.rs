//! In-memory fakes shared by the mirror integration tests.

use async_trait::async_trait;
use landchain_ledger::{
    ApprovalRole, Counters, LandInfo, Ledger, LedgerError, LedgerEvent, LedgerResult, PlotInfo,
    RequestApprovals, RequestStatus, TransferRequestInfo, TxReceipt,
};
use landchain_mirror::{
    LandParcelRecord, MirrorError, MirrorResult, MirrorTable, PlotRecord, ReconcileStore,
    SyncOutcome, SyncReport, TableKind, TransferRequestRecord, TransferStore,
};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

pub const HOLDER: &str = "0x00000000000000000000000000000000000000aa";
pub const RECIPIENT: &str = "0x00000000000000000000000000000000000000bb";
pub const SIGNER: &str = "0x00000000000000000000000000000000000000cc";
pub const TREASURY: &str = "0x00000000000000000000000000000000000000ee";

fn receipt(events: Vec<LedgerEvent>) -> TxReceipt {
    TxReceipt {
        tx_hash: "0xfake".to_string(),
        gas_used: "21000".to_string(),
        status: true,
        events,
    }
}

#[derive(Debug, Clone)]
pub struct FakeRequest {
    pub plot_id: u64,
    pub to: String,
    pub land_authority: bool,
    pub bank: bool,
    pub lawyer: bool,
}

/// Ledger fake holding plots and transfer requests behind a mutex. The
/// third approval on a request flips the plot's owner to the request's
/// recipient, matching the contract's approve-then-execute behavior.
pub struct FakeLedger {
    pub lands: Vec<LandInfo>,
    pub plots: Mutex<BTreeMap<u64, PlotInfo>>,
    pub requests: Mutex<BTreeMap<u64, FakeRequest>>,
    pub fail_writes: AtomicBool,
    /// Number of upcoming plot reads to fail
    pub fail_plot_reads: AtomicU64,
    pub write_count: AtomicU64,
}

impl FakeLedger {
    pub fn new() -> Self {
        Self {
            lands: Vec::new(),
            plots: Mutex::new(BTreeMap::new()),
            requests: Mutex::new(BTreeMap::new()),
            fail_writes: AtomicBool::new(false),
            fail_plot_reads: AtomicU64::new(0),
            write_count: AtomicU64::new(0),
        }
    }

    /// One plot owned by HOLDER and one pending whole-plot transfer to
    /// RECIPIENT.
    pub fn with_pending_transfer() -> Self {
        let ledger = Self::new();
        ledger.plots.lock().unwrap().insert(
            1,
            PlotInfo {
                plot_account: "0x00000000000000000000000000000000000000dd".to_string(),
                plot_owner: HOLDER.to_string(),
                plot_name: "Plot One".to_string(),
                parcel_ids: vec!["1".to_string()],
                parcel_amounts: vec!["100".to_string()],
            },
        );
        ledger.requests.lock().unwrap().insert(
            1,
            FakeRequest {
                plot_id: 1,
                to: RECIPIENT.to_string(),
                land_authority: false,
                bank: false,
                lawyer: false,
            },
        );
        ledger
    }

    fn check_writes(&self) -> LedgerResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(LedgerError::transaction("injected write failure"));
        }
        self.write_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl Ledger for FakeLedger {
    async fn get_land_info(&self, token_id: u64) -> LedgerResult<LandInfo> {
        self.lands
            .get((token_id as usize).saturating_sub(1))
            .cloned()
            .ok_or_else(|| LedgerError::not_found("land token", token_id))
    }

    async fn get_all_land_info(&self) -> LedgerResult<Vec<LandInfo>> {
        Ok(self.lands.clone())
    }

    async fn get_plot_info(&self, plot_id: u64) -> LedgerResult<PlotInfo> {
        if self
            .fail_plot_reads
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(LedgerError::read("injected plot read failure"));
        }
        self.plots
            .lock()
            .unwrap()
            .get(&plot_id)
            .cloned()
            .ok_or_else(|| LedgerError::not_found("plot", plot_id))
    }

    async fn get_all_plot_info(&self) -> LedgerResult<Vec<PlotInfo>> {
        Ok(self.plots.lock().unwrap().values().cloned().collect())
    }

    async fn get_all_transfer_requests(&self) -> LedgerResult<Vec<TransferRequestInfo>> {
        Ok(self
            .requests
            .lock()
            .unwrap()
            .values()
            .map(|r| TransferRequestInfo {
                from: HOLDER.to_string(),
                to: r.to.clone(),
                parcel_id: "0".to_string(),
                parcel_amount: "0".to_string(),
                is_plot_transfer: true,
                plot_id: r.plot_id.to_string(),
                timestamp: "1700000000".to_string(),
                land_authority_approved: r.land_authority,
                lawyer_approved: r.lawyer,
                bank_approved: r.bank,
            })
            .collect())
    }

    async fn get_request_status(&self, request_id: u64) -> LedgerResult<RequestApprovals> {
        let requests = self.requests.lock().unwrap();
        let r = requests
            .get(&request_id)
            .ok_or_else(|| LedgerError::not_found("transfer request", request_id))?;
        Ok(RequestApprovals {
            land_authority_approved: r.land_authority,
            lawyer_approved: r.lawyer,
            bank_approved: r.bank,
        })
    }

    async fn get_current_counters(&self) -> LedgerResult<Counters> {
        Ok(Counters {
            plot_counter: self.plots.lock().unwrap().len() as u64,
            token_counter: self.lands.len() as u64,
        })
    }

    async fn get_parcel_shareholders(
        &self,
        plot_id: u64,
        _parcel_id: u64,
    ) -> LedgerResult<Vec<String>> {
        let plots = self.plots.lock().unwrap();
        let plot = plots
            .get(&plot_id)
            .ok_or_else(|| LedgerError::not_found("plot", plot_id))?;
        Ok(vec![plot.plot_owner.clone()])
    }

    async fn get_user_parcel_shares(
        &self,
        plot_id: u64,
        parcel_id: u64,
        user: &str,
    ) -> LedgerResult<String> {
        let total = self.get_parcel_total_shares(plot_id, parcel_id).await?;
        let plots = self.plots.lock().unwrap();
        let plot = plots
            .get(&plot_id)
            .ok_or_else(|| LedgerError::not_found("plot", plot_id))?;
        if user.eq_ignore_ascii_case(&plot.plot_owner) {
            Ok(total)
        } else {
            Ok("0".to_string())
        }
    }

    async fn get_parcel_total_shares(&self, plot_id: u64, parcel_id: u64) -> LedgerResult<String> {
        let plots = self.plots.lock().unwrap();
        let plot = plots
            .get(&plot_id)
            .ok_or_else(|| LedgerError::not_found("plot", plot_id))?;
        let total = plot
            .parcel_ids
            .iter()
            .position(|id| id == &parcel_id.to_string())
            .and_then(|idx| plot.parcel_amounts.get(idx).cloned())
            .unwrap_or_else(|| "0".to_string());
        Ok(total)
    }

    async fn get_user_parcels(
        &self,
        plot_id: u64,
        user: &str,
        parcel_filter: u64,
    ) -> LedgerResult<Vec<String>> {
        let plots = self.plots.lock().unwrap();
        let plot = plots
            .get(&plot_id)
            .ok_or_else(|| LedgerError::not_found("plot", plot_id))?;
        if !user.eq_ignore_ascii_case(&plot.plot_owner) {
            return Ok(Vec::new());
        }
        Ok(plot
            .parcel_ids
            .iter()
            .filter(|id| parcel_filter == 0 || *id == &parcel_filter.to_string())
            .cloned()
            .collect())
    }

    async fn get_ownership_basis_points(&self, plot_id: u64, user: &str) -> LedgerResult<u64> {
        let plots = self.plots.lock().unwrap();
        let plot = plots
            .get(&plot_id)
            .ok_or_else(|| LedgerError::not_found("plot", plot_id))?;
        if user.eq_ignore_ascii_case(&plot.plot_owner) {
            Ok(10_000)
        } else {
            Ok(0)
        }
    }

    async fn get_treasury_wallet(&self) -> LedgerResult<String> {
        Ok(TREASURY.to_string())
    }

    async fn get_token_uri(&self, token_id: u64) -> LedgerResult<String> {
        self.get_land_info(token_id)
            .await
            .map(|land| land.metadata_uri)
    }

    async fn create_token(
        &self,
        _block_name: &str,
        _parcel_name: &str,
        _metadata_uri: &str,
        _total_supply: &str,
    ) -> LedgerResult<TxReceipt> {
        self.check_writes()?;
        let token_id = self.lands.len() as u64 + 1;
        Ok(receipt(vec![LedgerEvent::TokenCreated { token_id }]))
    }

    async fn create_plot(
        &self,
        plot_name: &str,
        parcel_ids: &[u64],
        parcel_amounts: &[u64],
    ) -> LedgerResult<TxReceipt> {
        self.check_writes()?;
        let mut plots = self.plots.lock().unwrap();
        let plot_id = plots.len() as u64 + 1;
        plots.insert(
            plot_id,
            PlotInfo {
                plot_account: "0x00000000000000000000000000000000000000dd".to_string(),
                plot_owner: HOLDER.to_string(),
                plot_name: plot_name.to_string(),
                parcel_ids: parcel_ids.iter().map(|id| id.to_string()).collect(),
                parcel_amounts: parcel_amounts.iter().map(|a| a.to_string()).collect(),
            },
        );
        Ok(receipt(vec![LedgerEvent::PlotInitiated { plot_id }]))
    }

    async fn request_plot_transfer(&self, plot_id: u64, to: &str) -> LedgerResult<TxReceipt> {
        self.check_writes()?;
        let mut requests = self.requests.lock().unwrap();
        let request_id = requests.len() as u64 + 1;
        requests.insert(
            request_id,
            FakeRequest {
                plot_id,
                to: to.to_string(),
                land_authority: false,
                bank: false,
                lawyer: false,
            },
        );
        Ok(receipt(vec![LedgerEvent::TransferRequestCreated { request_id }]))
    }

    async fn request_parcel_transfer(
        &self,
        _parcel_id: u64,
        _amount: u64,
        to: &str,
        plot_id: u64,
    ) -> LedgerResult<TxReceipt> {
        self.request_plot_transfer(plot_id, to).await
    }

    async fn approve_and_execute(
        &self,
        _signer_address: &str,
        request_id: u64,
        role: ApprovalRole,
    ) -> LedgerResult<TxReceipt> {
        self.check_writes()?;
        let mut requests = self.requests.lock().unwrap();
        let request = requests
            .get_mut(&request_id)
            .ok_or_else(|| LedgerError::not_found("transfer request", request_id))?;
        match role {
            ApprovalRole::LandAuthority => request.land_authority = true,
            ApprovalRole::Bank => request.bank = true,
            ApprovalRole::Lawyer => request.lawyer = true,
        }
        if request.land_authority && request.bank && request.lawyer {
            if let Some(plot) = self.plots.lock().unwrap().get_mut(&request.plot_id) {
                plot.plot_owner = request.to.clone();
            }
        }
        Ok(receipt(vec![]))
    }
}

/// In-memory transfer store for aggregator tests.
pub struct MemoryStore {
    pub requests: Mutex<BTreeMap<i64, TransferRequestRecord>>,
    pub plots: Mutex<BTreeMap<i64, PlotRecord>>,
    pub fail_apply: AtomicBool,
    pub fail_update_holder: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            requests: Mutex::new(BTreeMap::new()),
            plots: Mutex::new(BTreeMap::new()),
            fail_apply: AtomicBool::new(false),
            fail_update_holder: AtomicBool::new(false),
        }
    }

    /// Mirror of [`FakeLedger::with_pending_transfer`].
    pub fn with_pending_transfer() -> Self {
        let store = Self::new();
        store.plots.lock().unwrap().insert(
            1,
            PlotRecord {
                plot_id: 1,
                plot_name: "Plot One".to_string(),
                current_holder: HOLDER.to_string(),
                parcel_ids: vec![1],
                parcel_amounts: vec![100],
            },
        );
        store
            .requests
            .lock()
            .unwrap()
            .insert(1, TransferRequestRecord::new(1, 1, true));
        store
    }
}

#[async_trait]
impl TransferStore for MemoryStore {
    async fn find_request(&self, request_id: i64) -> MirrorResult<Option<TransferRequestRecord>> {
        Ok(self.requests.lock().unwrap().get(&request_id).cloned())
    }

    async fn apply_approval(
        &self,
        request_id: i64,
        role: ApprovalRole,
    ) -> MirrorResult<TransferRequestRecord> {
        if self.fail_apply.load(Ordering::SeqCst) {
            return Err(MirrorError::invalid_input("request", "injected apply failure"));
        }
        let mut requests = self.requests.lock().unwrap();
        let record = requests
            .get_mut(&request_id)
            .ok_or_else(|| MirrorError::not_found("transfer request", request_id))?;
        match role {
            ApprovalRole::LandAuthority => record.land_authority_approved = true,
            ApprovalRole::Bank => record.bank_approved = true,
            ApprovalRole::Lawyer => record.lawyer_approved = true,
        }
        record.current_status = RequestStatus::from_approvals(
            record.land_authority_approved,
            record.bank_approved,
            record.lawyer_approved,
        );
        Ok(record.clone())
    }

    async fn update_holder(&self, plot_id: i64, new_holder: &str) -> MirrorResult<PlotRecord> {
        if self.fail_update_holder.load(Ordering::SeqCst) {
            return Err(MirrorError::invalid_input("plot", "injected holder failure"));
        }
        let mut plots = self.plots.lock().unwrap();
        let record = plots
            .get_mut(&plot_id)
            .ok_or_else(|| MirrorError::not_found("plot", plot_id))?;
        record.current_holder = new_holder.to_string();
        Ok(record.clone())
    }
}

/// In-memory reconcile store for write-through tests.
pub struct MemoryReconcileStore {
    pub lands: Mutex<BTreeMap<i64, LandParcelRecord>>,
    pub plots: Mutex<BTreeMap<i64, PlotRecord>>,
    pub requests: Mutex<BTreeMap<i64, TransferRequestRecord>>,
    pub sync_calls: AtomicU64,
    pub fail_inserts: AtomicBool,
}

impl MemoryReconcileStore {
    pub fn new() -> Self {
        Self {
            lands: Mutex::new(BTreeMap::new()),
            plots: Mutex::new(BTreeMap::new()),
            requests: Mutex::new(BTreeMap::new()),
            sync_calls: AtomicU64::new(0),
            fail_inserts: AtomicBool::new(false),
        }
    }

    fn check_inserts(&self, parameter: &str) -> MirrorResult<()> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(MirrorError::invalid_input(parameter, "injected insert failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl ReconcileStore for MemoryReconcileStore {
    async fn sync(&self, kind: TableKind) -> MirrorResult<SyncOutcome> {
        self.sync_calls.fetch_add(1, Ordering::SeqCst);
        let rows = match kind {
            TableKind::Land => self.lands.lock().unwrap().len(),
            TableKind::Plot => self.plots.lock().unwrap().len(),
            TableKind::Request => self.requests.lock().unwrap().len(),
        };
        Ok(SyncOutcome::AlreadyPopulated { rows: rows as u64 })
    }

    async fn insert_land(&self, record: &LandParcelRecord) -> MirrorResult<LandParcelRecord> {
        self.check_inserts("land")?;
        let mut lands = self.lands.lock().unwrap();
        if lands.contains_key(&record.token_id) {
            return Err(MirrorError::DuplicateKey {
                table: TableKind::Land.table_name().to_string(),
                id: record.token_id,
            });
        }
        lands.insert(record.token_id, record.clone());
        Ok(record.clone())
    }

    async fn insert_plot(&self, record: &PlotRecord) -> MirrorResult<PlotRecord> {
        self.check_inserts("plot")?;
        let mut plots = self.plots.lock().unwrap();
        if plots.contains_key(&record.plot_id) {
            return Err(MirrorError::DuplicateKey {
                table: TableKind::Plot.table_name().to_string(),
                id: record.plot_id,
            });
        }
        plots.insert(record.plot_id, record.clone());
        Ok(record.clone())
    }

    async fn insert_request(
        &self,
        record: &TransferRequestRecord,
    ) -> MirrorResult<Option<TransferRequestRecord>> {
        self.check_inserts("request")?;
        let mut requests = self.requests.lock().unwrap();
        if requests.contains_key(&record.request_id) {
            // Same swallow as the Postgres table: the row is already mirrored
            return Ok(None);
        }
        requests.insert(record.request_id, record.clone());
        Ok(Some(record.clone()))
    }

    async fn find_plot(&self, plot_id: i64) -> MirrorResult<Option<PlotRecord>> {
        Ok(self.plots.lock().unwrap().get(&plot_id).cloned())
    }

    async fn find_plot_by_name(&self, plot_name: &str) -> MirrorResult<Option<PlotRecord>> {
        Ok(self
            .plots
            .lock()
            .unwrap()
            .values()
            .find(|p| p.plot_name == plot_name)
            .cloned())
    }

    async fn find_land_by_names(
        &self,
        block_name: &str,
        parcel_name: &str,
    ) -> MirrorResult<Option<LandParcelRecord>> {
        Ok(self
            .lands
            .lock()
            .unwrap()
            .values()
            .find(|l| l.block_name == block_name && l.parcel_name == parcel_name)
            .cloned())
    }

    async fn fetch_rows(&self, kind: TableKind) -> MirrorResult<Vec<Value>> {
        let rows = match kind {
            TableKind::Land => self
                .lands
                .lock()
                .unwrap()
                .values()
                .map(serde_json::to_value)
                .collect::<Result<Vec<_>, _>>(),
            TableKind::Plot => self
                .plots
                .lock()
                .unwrap()
                .values()
                .map(serde_json::to_value)
                .collect::<Result<Vec<_>, _>>(),
            TableKind::Request => self
                .requests
                .lock()
                .unwrap()
                .values()
                .map(serde_json::to_value)
                .collect::<Result<Vec<_>, _>>(),
        };
        rows.map_err(|e| MirrorError::invalid_input("row", format!("serialization failed: {}", e)))
    }

    async fn drop_table(&self, kind: TableKind) -> MirrorResult<bool> {
        let dropped = match kind {
            TableKind::Land => {
                let mut lands = self.lands.lock().unwrap();
                let had = !lands.is_empty();
                lands.clear();
                had
            }
            TableKind::Plot => {
                let mut plots = self.plots.lock().unwrap();
                let had = !plots.is_empty();
                plots.clear();
                had
            }
            TableKind::Request => {
                let mut requests = self.requests.lock().unwrap();
                let had = !requests.is_empty();
                requests.clear();
                had
            }
        };
        Ok(dropped)
    }
}

/// Minimal table fake for reconciliation-engine tests.
pub struct FakeTable {
    pub present: AtomicBool,
    pub rows: AtomicU64,
    pub schema_calls: AtomicU64,
    pub resync_calls: AtomicU64,
    pub resync_report: SyncReport,
}

impl FakeTable {
    pub fn new(present: bool, rows: u64) -> Self {
        Self {
            present: AtomicBool::new(present),
            rows: AtomicU64::new(rows),
            schema_calls: AtomicU64::new(0),
            resync_calls: AtomicU64::new(0),
            resync_report: SyncReport { synced: 3, skipped: 1 },
        }
    }
}

#[async_trait]
impl MirrorTable for FakeTable {
    fn kind(&self) -> TableKind {
        TableKind::Land
    }

    async fn exists(&self) -> MirrorResult<bool> {
        Ok(self.present.load(Ordering::SeqCst))
    }

    async fn ensure_schema(&self) -> MirrorResult<()> {
        self.schema_calls.fetch_add(1, Ordering::SeqCst);
        self.present.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn row_count(&self) -> MirrorResult<u64> {
        Ok(self.rows.load(Ordering::SeqCst))
    }

    async fn resync(&self) -> MirrorResult<SyncReport> {
        self.resync_calls.fetch_add(1, Ordering::SeqCst);
        self.rows.store(self.resync_report.synced, Ordering::SeqCst);
        Ok(self.resync_report)
    }
}
