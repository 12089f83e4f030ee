//! Approval aggregator
//!
//! Applies one role's approval to a transfer request: submits the ledger
//! transaction, write-through updates the mirrored request row, and when the
//! approval completes the workflow, diffs the plot's holder against the
//! pre-approval snapshot and updates the mirrored plot. Only the ledger
//! submission itself can fail the operation; every mirror step after the
//! confirmed transaction degrades instead.

use async_trait::async_trait;
use landchain_ledger::{is_well_formed_address, ApprovalRole, Ledger, TxReceipt};
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{MirrorError, MirrorResult};
use crate::outcome::Outcome;
use crate::records::{PlotRecord, TransferRequestRecord};
use crate::store::MirrorStore;

/// Mirror-side operations the aggregator needs. Split out as a trait so the
/// workflow logic is testable against an in-memory store.
#[async_trait]
pub trait TransferStore: Send + Sync {
    async fn find_request(&self, request_id: i64) -> MirrorResult<Option<TransferRequestRecord>>;
    async fn apply_approval(
        &self,
        request_id: i64,
        role: ApprovalRole,
    ) -> MirrorResult<TransferRequestRecord>;
    async fn update_holder(&self, plot_id: i64, new_holder: &str) -> MirrorResult<PlotRecord>;
}

#[async_trait]
impl TransferStore for MirrorStore {
    async fn find_request(&self, request_id: i64) -> MirrorResult<Option<TransferRequestRecord>> {
        self.requests.find(request_id).await
    }

    async fn apply_approval(
        &self,
        request_id: i64,
        role: ApprovalRole,
    ) -> MirrorResult<TransferRequestRecord> {
        self.requests.apply_approval(request_id, role).await
    }

    async fn update_holder(&self, plot_id: i64, new_holder: &str) -> MirrorResult<PlotRecord> {
        self.plots.update_holder(plot_id, new_holder).await
    }
}

/// Result of one approval submission.
#[derive(Debug, Clone)]
pub struct ApprovalReceipt {
    pub receipt: TxReceipt,
    pub role: ApprovalRole,
    /// The mirrored request after the approval, when the mirror kept up
    pub request: Option<TransferRequestRecord>,
    /// Whether the mirrored plot holder changed in this call
    pub holder_updated: bool,
}

/// Coordinates the three-party approval workflow.
#[derive(Clone)]
pub struct ApprovalCoordinator {
    ledger: Arc<dyn Ledger>,
    store: Arc<dyn TransferStore>,
}

impl ApprovalCoordinator {
    pub fn new(ledger: Arc<dyn Ledger>, store: Arc<dyn TransferStore>) -> Self {
        Self { ledger, store }
    }

    /// Submit one role's approval for a transfer request.
    ///
    /// The third approval causes the contract to execute the ownership
    /// transfer in the same transaction, so after a completing approval the
    /// plot's holder is re-read from the ledger and the mirror updated if it
    /// changed. Errors before submission are hard failures; anything after
    /// the confirmed receipt degrades the outcome with a warning.
    pub async fn approve(
        &self,
        request_id: u64,
        signer_address: &str,
        role_code: u8,
    ) -> MirrorResult<Outcome<ApprovalReceipt>> {
        let role = ApprovalRole::from_code(role_code).ok_or_else(|| {
            MirrorError::invalid_input(
                "role",
                format!("role code must be 1, 2 or 3, got {}", role_code),
            )
        })?;
        if !is_well_formed_address(signer_address) {
            return Err(MirrorError::invalid_input(
                "signer_address",
                "must be a 0x-prefixed 40-hex-digit address",
            ));
        }
        if request_id == 0 {
            return Err(MirrorError::invalid_input(
                "request_id",
                "must be a positive integer",
            ));
        }

        let cached = self
            .store
            .find_request(request_id as i64)
            .await?
            .ok_or_else(|| MirrorError::not_found("transfer request", request_id))?;

        // Ledger-side holder before the approval, for the post-completion diff
        let prior_holder = match self.ledger.get_plot_info(cached.plot_id as u64).await {
            Ok(info) => Some(info.plot_owner),
            Err(e) => {
                warn!("Pre-approval plot read failed: {}", e);
                None
            }
        };

        let receipt = self
            .ledger
            .approve_and_execute(signer_address, request_id, role)
            .await?;
        info!(
            "{} approval for request {} confirmed in tx {}",
            role, request_id, receipt.tx_hash
        );

        let mut warnings: Vec<String> = Vec::new();

        let request = match self.store.apply_approval(request_id as i64, role).await {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Mirror approval write for request {} failed: {}", request_id, e);
                warnings.push(format!("Mirrored request not updated: {}", e));
                None
            }
        };

        let mut holder_updated = false;
        if request.as_ref().map(|r| r.all_approved()).unwrap_or(false) {
            match self.sync_holder(cached.plot_id, prior_holder.as_deref()).await {
                Ok(updated) => holder_updated = updated,
                Err(e) => {
                    warn!("Post-completion holder sync for plot {} failed: {}", cached.plot_id, e);
                    warnings.push(format!("Mirrored plot holder not updated: {}", e));
                }
            }
        }

        let value = ApprovalReceipt {
            receipt,
            role,
            request,
            holder_updated,
        };
        if warnings.is_empty() {
            Ok(Outcome::Complete(value))
        } else {
            Ok(Outcome::Degraded {
                value,
                warning: warnings.join("; "),
            })
        }
    }

    /// Re-read the plot's holder from the ledger and update the mirror when
    /// it differs from the pre-approval snapshot. Returns whether an update
    /// was written.
    async fn sync_holder(&self, plot_id: i64, prior_holder: Option<&str>) -> MirrorResult<bool> {
        // Without a snapshot there is no diff basis; leave the row alone and
        // let the next resync pick the holder up.
        let Some(prior) = prior_holder else {
            return Ok(false);
        };
        let info = self.ledger.get_plot_info(plot_id as u64).await?;
        if info.plot_owner.is_empty() || prior == info.plot_owner {
            return Ok(false);
        }
        self.store.update_holder(plot_id, &info.plot_owner).await?;
        info!("Plot {} holder updated to {}", plot_id, info.plot_owner);
        Ok(true)
    }
}
