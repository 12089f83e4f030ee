//! Mirror row types
//!
//! One struct per mirror table. Primary keys are ledger-assigned sequential
//! ids; the mirror never invents them.

use landchain_ledger::RequestStatus;
use serde::{Deserialize, Serialize};

/// Row of `land_parcel_registry` - one fungible land token.
///
/// Never updated in place; rows appear via resync or write-through insert
/// and disappear only with an administrative table drop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandParcelRecord {
    pub token_id: i64,
    pub parcel_name: String,
    pub block_name: String,
    /// Decimal string, full uint256 width
    pub total_supply: String,
    pub metadata_uri: String,
}

/// Row of `plot_registry` - one named bundle of parcel shares.
///
/// `parcel_ids` and `parcel_amounts` are index-aligned and of equal length.
/// `current_holder` is the only mutable field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlotRecord {
    pub plot_id: i64,
    pub plot_name: String,
    pub current_holder: String,
    pub parcel_ids: Vec<i64>,
    pub parcel_amounts: Vec<i64>,
}

/// Row of `transfer_request_registry` - one transfer workflow instance.
///
/// Approval booleans flip monotonically false to true; `current_status` is
/// recomputed on every approval write and always satisfies: COMPLETED iff
/// all three true, PENDING iff none, otherwise IN_PROGRESS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequestRecord {
    pub request_id: i64,
    pub plot_id: i64,
    pub is_plot_transfer: bool,
    pub land_authority_approved: bool,
    pub lawyer_approved: bool,
    pub bank_approved: bool,
    pub current_status: RequestStatus,
}

impl TransferRequestRecord {
    /// A fresh request with no approvals.
    pub fn new(request_id: i64, plot_id: i64, is_plot_transfer: bool) -> Self {
        Self {
            request_id,
            plot_id,
            is_plot_transfer,
            land_authority_approved: false,
            lawyer_approved: false,
            bank_approved: false,
            current_status: RequestStatus::Pending,
        }
    }

    /// True when all three roles have approved.
    pub fn all_approved(&self) -> bool {
        self.land_authority_approved && self.lawyer_approved && self.bank_approved
    }
}
