//! Transaction receipt types

use serde::{Deserialize, Serialize};

/// Events decoded from a confirmed transaction receipt.
///
/// Newly assigned identifiers are always taken from these events rather than
/// from a pre-transaction counter read, so concurrent submissions cannot
/// disagree with the ledger about the id they were assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LedgerEvent {
    TokenCreated { token_id: u64 },
    PlotInitiated { plot_id: u64 },
    TransferRequestCreated { request_id: u64 },
}

/// Durable receipt of a confirmed ledger transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    /// 0x-prefixed transaction hash
    pub tx_hash: String,

    /// Gas used by the transaction, decimal string
    pub gas_used: String,

    /// Whether the transaction succeeded on chain
    pub status: bool,

    /// Decoded registry events emitted by the transaction
    pub events: Vec<LedgerEvent>,
}

impl TxReceipt {
    /// The token id from a `TokenCreated` event, if one was emitted.
    pub fn token_id(&self) -> Option<u64> {
        self.events.iter().find_map(|event| match event {
            LedgerEvent::TokenCreated { token_id } => Some(*token_id),
            _ => None,
        })
    }

    /// The plot id from a `PlotInitiated` event, if one was emitted.
    pub fn plot_id(&self) -> Option<u64> {
        self.events.iter().find_map(|event| match event {
            LedgerEvent::PlotInitiated { plot_id } => Some(*plot_id),
            _ => None,
        })
    }

    /// The request id from a `TransferRequestCreated` event, if one was
    /// emitted.
    pub fn request_id(&self) -> Option<u64> {
        self.events.iter().find_map(|event| match event {
            LedgerEvent::TransferRequestCreated { request_id } => Some(*request_id),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_accessors() {
        let receipt = TxReceipt {
            tx_hash: "0xabc".to_string(),
            gas_used: "21000".to_string(),
            status: true,
            events: vec![
                LedgerEvent::TokenCreated { token_id: 7 },
                LedgerEvent::TransferRequestCreated { request_id: 3 },
            ],
        };
        assert_eq!(receipt.token_id(), Some(7));
        assert_eq!(receipt.request_id(), Some(3));
        assert_eq!(receipt.plot_id(), None);
    }
}
