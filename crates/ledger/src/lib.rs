//! Ledger trait - core abstraction over the land-registry contract
//!
//! This crate defines the `Ledger` trait which provides a unified interface
//! to the authoritative on-chain land registry (tokens, plots, transfer
//! requests). The mirror store and the gateway only ever talk to the chain
//! through this trait, so test suites can substitute in-process fakes and
//! the concrete chain client stays swappable.

use async_trait::async_trait;

pub mod error;
pub mod types;

pub use error::{LedgerError, LedgerResult};
pub use types::*;

/// Unified interface to the authoritative land-registry ledger.
///
/// Read calls never mutate chain state. Write calls submit a transaction,
/// wait for confirmation and return a [`TxReceipt`]; once a receipt is
/// returned the chain mutation is irreversible - there is no local rollback.
/// The facade performs no retries; callers decide.
#[async_trait]
pub trait Ledger: Send + Sync {
    // ===== Read operations =====

    /// Fetch a single land token by its ledger-assigned id.
    async fn get_land_info(&self, token_id: u64) -> LedgerResult<LandInfo>;

    /// Fetch all land tokens in ledger enumeration order.
    ///
    /// The bulk read does not expose native token ids; entries are returned
    /// in the ledger's enumeration order.
    async fn get_all_land_info(&self) -> LedgerResult<Vec<LandInfo>>;

    /// Fetch a single plot account by its ledger-assigned id.
    async fn get_plot_info(&self, plot_id: u64) -> LedgerResult<PlotInfo>;

    /// Fetch all plot accounts in ledger enumeration order.
    async fn get_all_plot_info(&self) -> LedgerResult<Vec<PlotInfo>>;

    /// Fetch all transfer requests in ledger enumeration order.
    async fn get_all_transfer_requests(&self) -> LedgerResult<Vec<TransferRequestInfo>>;

    /// Fetch the approval flags of a single transfer request.
    async fn get_request_status(&self, request_id: u64) -> LedgerResult<RequestApprovals>;

    /// Read the current plot and token id counters.
    async fn get_current_counters(&self) -> LedgerResult<Counters>;

    /// Addresses holding shares of one parcel within a plot.
    async fn get_parcel_shareholders(
        &self,
        plot_id: u64,
        parcel_id: u64,
    ) -> LedgerResult<Vec<String>>;

    /// Shares a user holds of one parcel within a plot, decimal string.
    async fn get_user_parcel_shares(
        &self,
        plot_id: u64,
        parcel_id: u64,
        user: &str,
    ) -> LedgerResult<String>;

    /// Total shares of one parcel within a plot, decimal string.
    async fn get_parcel_total_shares(
        &self,
        plot_id: u64,
        parcel_id: u64,
    ) -> LedgerResult<String>;

    /// Parcel ids a user holds shares of within a plot, decimal strings.
    ///
    /// `parcel_filter` of zero means no filter; a nonzero value restricts
    /// the result to that parcel.
    async fn get_user_parcels(
        &self,
        plot_id: u64,
        user: &str,
        parcel_filter: u64,
    ) -> LedgerResult<Vec<String>>;

    /// A user's ownership share of a plot in basis points (10000 = 100%).
    async fn get_ownership_basis_points(&self, plot_id: u64, user: &str) -> LedgerResult<u64>;

    /// The registry's treasury wallet address.
    async fn get_treasury_wallet(&self) -> LedgerResult<String>;

    /// Metadata URI of a land token.
    async fn get_token_uri(&self, token_id: u64) -> LedgerResult<String>;

    // ===== Write operations =====

    /// Create a new fungible land token.
    ///
    /// `total_supply` is a decimal string to preserve full uint256 width.
    /// The confirmed receipt carries a [`LedgerEvent::TokenCreated`] event
    /// with the ledger-assigned token id.
    async fn create_token(
        &self,
        block_name: &str,
        parcel_name: &str,
        metadata_uri: &str,
        total_supply: &str,
    ) -> LedgerResult<TxReceipt>;

    /// Initiate a new plot bundling parcel shares.
    ///
    /// The confirmed receipt carries a [`LedgerEvent::PlotInitiated`] event
    /// with the ledger-assigned plot id.
    async fn create_plot(
        &self,
        plot_name: &str,
        parcel_ids: &[u64],
        parcel_amounts: &[u64],
    ) -> LedgerResult<TxReceipt>;

    /// Request transfer of a whole plot to `to`.
    ///
    /// The confirmed receipt carries a
    /// [`LedgerEvent::TransferRequestCreated`] event with the request id.
    async fn request_plot_transfer(&self, plot_id: u64, to: &str) -> LedgerResult<TxReceipt>;

    /// Request transfer of a single parcel share within a plot.
    async fn request_parcel_transfer(
        &self,
        parcel_id: u64,
        amount: u64,
        to: &str,
        plot_id: u64,
    ) -> LedgerResult<TxReceipt>;

    /// Record one role's approval on a transfer request.
    ///
    /// When this is the third and final approval the contract executes the
    /// ownership transfer atomically in the same transaction - there is no
    /// separate "transfer executed" receipt to observe.
    async fn approve_and_execute(
        &self,
        signer_address: &str,
        request_id: u64,
        role: ApprovalRole,
    ) -> LedgerResult<TxReceipt>;
}
