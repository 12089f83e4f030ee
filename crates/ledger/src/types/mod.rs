//! Domain wire types shared between the chain client, the mirror store and
//! the gateway.

use serde::{Deserialize, Serialize};

pub mod land;
pub mod plot;
pub mod receipt;
pub mod request;

pub use land::LandInfo;
pub use plot::PlotInfo;
pub use receipt::{LedgerEvent, TxReceipt};
pub use request::{ApprovalRole, RequestApprovals, RequestStatus, TransferRequestInfo};

/// Current plot and token id counters as reported by the ledger.
///
/// Diagnostic only: new ids are always derived from confirmed receipt
/// events, never from a pre-transaction counter read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    /// Id assigned to the most recently initiated plot
    pub plot_counter: u64,
    /// Id assigned to the most recently created token
    pub token_counter: u64,
}

/// Check that a string is a well-formed 0x-prefixed 20-byte hex address.
pub fn is_well_formed_address(address: &str) -> bool {
    address.len() == 42
        && address.starts_with("0x")
        && address[2..].chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed_address() {
        assert!(is_well_formed_address(
            "0x5FbDB2315678afecb367f032d93F642f64180aa3"
        ));
        assert!(is_well_formed_address(
            "0x0000000000000000000000000000000000000000"
        ));
    }

    #[test]
    fn test_malformed_addresses() {
        let cases = [
            "",
            "0x",
            "5FbDB2315678afecb367f032d93F642f64180aa3",
            "0x5FbDB2315678afecb367f032d93F642f64180aa",
            "0x5FbDB2315678afecb367f032d93F642f64180aa3f",
            "0xZFbDB2315678afecb367f032d93F642f64180aa3",
        ];
        for case in cases {
            assert!(!is_well_formed_address(case), "should reject: {}", case);
        }
    }
}
