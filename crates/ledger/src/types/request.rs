//! Transfer request types, approval roles and aggregate status

use serde::{Deserialize, Serialize};
use std::fmt;

/// The three approval roles of the transfer workflow.
///
/// Numeric codes match the contract's role parameter: 1 = land authority,
/// 2 = bank, 3 = lawyer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalRole {
    LandAuthority,
    Bank,
    Lawyer,
}

impl ApprovalRole {
    /// Parse a contract role code. Returns `None` for anything outside 1-3.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::LandAuthority),
            2 => Some(Self::Bank),
            3 => Some(Self::Lawyer),
            _ => None,
        }
    }

    /// The contract-side role code.
    pub fn code(&self) -> u8 {
        match self {
            Self::LandAuthority => 1,
            Self::Bank => 2,
            Self::Lawyer => 3,
        }
    }

    /// Human-readable role name used in responses.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::LandAuthority => "Land Authority",
            Self::Bank => "Bank",
            Self::Lawyer => "Lawyer",
        }
    }
}

impl fmt::Display for ApprovalRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Aggregate status of a transfer request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    Pending,
    InProgress,
    Completed,
}

impl RequestStatus {
    /// Recompute aggregate status from the three approval flags.
    ///
    /// COMPLETED iff all three are true, PENDING iff none are, otherwise
    /// IN_PROGRESS.
    pub fn from_approvals(land_authority: bool, bank: bool, lawyer: bool) -> Self {
        match (land_authority, bank, lawyer) {
            (true, true, true) => Self::Completed,
            (false, false, false) => Self::Pending,
            _ => Self::InProgress,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
        }
    }

    /// Parse the stored status string. Unknown values map to `Pending`.
    pub fn parse(value: &str) -> Self {
        match value {
            "COMPLETED" => Self::Completed,
            "IN_PROGRESS" => Self::InProgress,
            _ => Self::Pending,
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One transfer workflow instance as read from the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequestInfo {
    /// Address that opened the request
    pub from: String,

    /// Recipient address
    pub to: String,

    /// Parcel token id, decimal string (zero for whole-plot transfers)
    pub parcel_id: String,

    /// Parcel share amount, decimal string
    pub parcel_amount: String,

    /// Whole-plot transfer vs single-parcel-share transfer
    pub is_plot_transfer: bool,

    /// Plot the request refers to, decimal string
    pub plot_id: String,

    /// Unix timestamp of request creation, decimal string
    pub timestamp: String,

    pub land_authority_approved: bool,
    pub lawyer_approved: bool,
    pub bank_approved: bool,
}

/// Approval flags subset returned by the per-request status read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestApprovals {
    pub land_authority_approved: bool,
    pub lawyer_approved: bool,
    pub bank_approved: bool,
}

impl RequestApprovals {
    /// True when all three roles have approved.
    pub fn all_approved(&self) -> bool {
        self.land_authority_approved && self.lawyer_approved && self.bank_approved
    }
}
