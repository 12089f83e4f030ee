//! Ethereum implementation of the land-registry ledger
//!
//! Implements the [`Ledger`](landchain_ledger::Ledger) trait against the
//! deployed land-registry contract on any EVM chain via Alloy.
//!
//! Providers are created per call and never cached; the client itself is
//! constructed once at process start and injected wherever chain access is
//! needed.

pub mod abi;
pub mod config;
pub mod contract;
pub mod conversions;
pub mod ledger;

pub use config::EthereumLedgerConfig;
pub use contract::ContractClient;
pub use ledger::EthereumLedger;

/// Re-export the Ledger trait for convenience
pub use landchain_ledger::Ledger;
