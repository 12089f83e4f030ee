//! Ethereum implementation of the `Ledger` trait
//!
//! Each operation builds a fresh provider, performs a single contract call
//! or transaction, and maps the result into the domain types. Write
//! operations wait for the confirmed receipt and decode the registry events
//! from its logs - newly assigned ids are taken from those events, never
//! from a counter read made before submission.

use async_trait::async_trait;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

use alloy::primitives::{Address, U256};
use alloy::rpc::types::TransactionReceipt;

use landchain_ledger::{
    ApprovalRole, Counters, LandInfo, Ledger, LedgerError, LedgerEvent, LedgerResult, PlotInfo,
    RequestApprovals, TransferRequestInfo, TxReceipt,
};

use crate::abi::ILandRegistry;
use crate::config::EthereumLedgerConfig;
use crate::contract::ContractClient;
use crate::conversions::{address_to_string, u256_to_decimal, u256_to_id, u256_vec_to_decimals};

/// Ledger implementation backed by the deployed land-registry contract.
pub struct EthereumLedger {
    contract: Arc<ContractClient>,
}

impl EthereumLedger {
    /// Create a new Ethereum ledger client.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration validation or address/key parsing
    /// fails.
    pub fn new(config: EthereumLedgerConfig) -> LedgerResult<Self> {
        config.validate().map_err(LedgerError::Configuration)?;
        let contract = Arc::new(ContractClient::new(config)?);
        Ok(Self { contract })
    }

    /// The chain id this client is configured for.
    pub fn chain_id(&self) -> u64 {
        self.contract.chain_id()
    }

    fn parse_address(value: &str, parameter: &str) -> LedgerResult<Address> {
        Address::from_str(value)
            .map_err(|e| LedgerError::invalid_input(parameter, e.to_string()))
    }

    /// Decode the registry events this gateway cares about from a confirmed
    /// receipt. Logs from unrelated contracts or events are skipped.
    fn decode_receipt(receipt: &TransactionReceipt) -> TxReceipt {
        let mut events = Vec::new();
        for log in receipt.inner.logs() {
            if let Ok(decoded) = log.log_decode::<ILandRegistry::TokenCreated>() {
                events.push(LedgerEvent::TokenCreated {
                    token_id: u256_to_id(decoded.data().tokenId),
                });
            } else if let Ok(decoded) = log.log_decode::<ILandRegistry::PlotInitiated>() {
                events.push(LedgerEvent::PlotInitiated {
                    plot_id: u256_to_id(decoded.data().plotId),
                });
            } else if let Ok(decoded) = log.log_decode::<ILandRegistry::TransferRequestCreated>() {
                events.push(LedgerEvent::TransferRequestCreated {
                    request_id: u256_to_id(decoded.data().requestId),
                });
            }
        }

        TxReceipt {
            tx_hash: format!("0x{:x}", receipt.transaction_hash),
            gas_used: receipt.gas_used.to_string(),
            status: receipt.status(),
            events,
        }
    }

    /// Check that a confirmed receipt succeeded and carries the event the
    /// submitted operation must emit.
    fn require_event(
        receipt: TxReceipt,
        event: &str,
        present: bool,
    ) -> LedgerResult<TxReceipt> {
        if !receipt.status {
            return Err(LedgerError::transaction(format!(
                "transaction {} reverted",
                receipt.tx_hash
            )));
        }
        if !present {
            return Err(LedgerError::MissingEvent {
                event: event.to_string(),
                tx_hash: receipt.tx_hash,
            });
        }
        Ok(receipt)
    }

    fn land_from_solidity(land: ILandRegistry::LandInfo) -> LandInfo {
        LandInfo {
            block_name: land.blockInfo,
            parcel_name: land.parcelInfo,
            metadata_uri: land.blockParcelTokenURI,
            total_supply: u256_to_decimal(land.totalSupply),
            plot_allocation: u256_vec_to_decimals(&land.plotAllocation),
        }
    }

    fn plot_from_solidity(plot: ILandRegistry::PlotAccountInfo) -> PlotInfo {
        PlotInfo {
            plot_account: address_to_string(plot.plotAccount),
            plot_owner: address_to_string(plot.plotOwner),
            plot_name: plot.plotName,
            parcel_ids: u256_vec_to_decimals(&plot.parcelIds),
            parcel_amounts: u256_vec_to_decimals(&plot.parcelAmounts),
        }
    }

    fn request_from_solidity(request: ILandRegistry::TransferRequest) -> TransferRequestInfo {
        TransferRequestInfo {
            from: address_to_string(request.from),
            to: address_to_string(request.to),
            parcel_id: u256_to_decimal(request.parcelId),
            parcel_amount: u256_to_decimal(request.parcelAmount),
            is_plot_transfer: request.isPlotTransfer,
            plot_id: u256_to_decimal(request.plotId),
            timestamp: u256_to_decimal(request.timestamp),
            land_authority_approved: request.landAuthorityApproved,
            lawyer_approved: request.lawyerApproved,
            bank_approved: request.bankApproved,
        }
    }
}

#[async_trait]
impl Ledger for EthereumLedger {
    // ===== Read operations =====

    async fn get_land_info(&self, token_id: u64) -> LedgerResult<LandInfo> {
        debug!("Fetching land info for token {}", token_id);

        let provider = self.contract.create_provider()?;
        let registry = ILandRegistry::new(*self.contract.contract_address(), &provider);

        let land = registry
            .getLandInfo(U256::from(token_id))
            .call()
            .await
            .map_err(|e| LedgerError::read(e.to_string()))?;

        Ok(Self::land_from_solidity(land))
    }

    async fn get_all_land_info(&self) -> LedgerResult<Vec<LandInfo>> {
        debug!("Fetching all land info");

        let provider = self.contract.create_provider()?;
        let registry = ILandRegistry::new(*self.contract.contract_address(), &provider);

        let lands = registry
            .getAllLandInfo()
            .call()
            .await
            .map_err(|e| LedgerError::read(e.to_string()))?;

        debug!("Fetched {} land entries", lands.len());
        Ok(lands.into_iter().map(Self::land_from_solidity).collect())
    }

    async fn get_plot_info(&self, plot_id: u64) -> LedgerResult<PlotInfo> {
        debug!("Fetching plot info for plot {}", plot_id);

        let provider = self.contract.create_provider()?;
        let registry = ILandRegistry::new(*self.contract.contract_address(), &provider);

        let plot = registry
            .getPlotAccountInfo(U256::from(plot_id))
            .call()
            .await
            .map_err(|e| LedgerError::read(e.to_string()))?;

        Ok(Self::plot_from_solidity(plot))
    }

    async fn get_all_plot_info(&self) -> LedgerResult<Vec<PlotInfo>> {
        debug!("Fetching all plot account info");

        let provider = self.contract.create_provider()?;
        let registry = ILandRegistry::new(*self.contract.contract_address(), &provider);

        let plots = registry
            .getAllPlotAccountInfo()
            .call()
            .await
            .map_err(|e| LedgerError::read(e.to_string()))?;

        debug!("Fetched {} plot entries", plots.len());
        Ok(plots.into_iter().map(Self::plot_from_solidity).collect())
    }

    async fn get_all_transfer_requests(&self) -> LedgerResult<Vec<TransferRequestInfo>> {
        debug!("Fetching all transfer requests");

        let provider = self.contract.create_provider()?;
        let registry = ILandRegistry::new(*self.contract.contract_address(), &provider);

        let requests = registry
            .getAllTransferRequestInfo()
            .call()
            .await
            .map_err(|e| LedgerError::read(e.to_string()))?;

        debug!("Fetched {} transfer requests", requests.len());
        Ok(requests
            .into_iter()
            .map(Self::request_from_solidity)
            .collect())
    }

    async fn get_request_status(&self, request_id: u64) -> LedgerResult<RequestApprovals> {
        debug!("Fetching request status for request {}", request_id);

        let provider = self.contract.create_provider()?;
        let registry = ILandRegistry::new(*self.contract.contract_address(), &provider);

        let request = registry
            .requestStatus(U256::from(request_id))
            .call()
            .await
            .map_err(|e| LedgerError::read(e.to_string()))?;

        Ok(RequestApprovals {
            land_authority_approved: request.landAuthorityApproved,
            lawyer_approved: request.lawyerApproved,
            bank_approved: request.bankApproved,
        })
    }

    async fn get_current_counters(&self) -> LedgerResult<Counters> {
        debug!("Fetching current plot and token counters");

        let provider = self.contract.create_provider()?;
        let registry = ILandRegistry::new(*self.contract.contract_address(), &provider);

        let counters = registry
            .getCurrentPlotAndTokenIdInfo()
            .call()
            .await
            .map_err(|e| LedgerError::read(e.to_string()))?;

        Ok(Counters {
            plot_counter: u256_to_id(counters._0),
            token_counter: u256_to_id(counters._1),
        })
    }

    async fn get_parcel_shareholders(
        &self,
        plot_id: u64,
        parcel_id: u64,
    ) -> LedgerResult<Vec<String>> {
        debug!(
            "Fetching shareholders of parcel {} in plot {}",
            parcel_id, plot_id
        );

        let provider = self.contract.create_provider()?;
        let registry = ILandRegistry::new(*self.contract.contract_address(), &provider);

        let shareholders = registry
            .getPlotAccountParcelShareholders(U256::from(plot_id), U256::from(parcel_id))
            .call()
            .await
            .map_err(|e| LedgerError::read(e.to_string()))?;

        Ok(shareholders.into_iter().map(address_to_string).collect())
    }

    async fn get_user_parcel_shares(
        &self,
        plot_id: u64,
        parcel_id: u64,
        user: &str,
    ) -> LedgerResult<String> {
        debug!(
            "Fetching shares of {} in parcel {} of plot {}",
            user, parcel_id, plot_id
        );

        let user = Self::parse_address(user, "user")?;
        let provider = self.contract.create_provider()?;
        let registry = ILandRegistry::new(*self.contract.contract_address(), &provider);

        let shares = registry
            .getPlotAccountUserShares(U256::from(plot_id), U256::from(parcel_id), user)
            .call()
            .await
            .map_err(|e| LedgerError::read(e.to_string()))?;

        Ok(u256_to_decimal(shares))
    }

    async fn get_parcel_total_shares(
        &self,
        plot_id: u64,
        parcel_id: u64,
    ) -> LedgerResult<String> {
        debug!(
            "Fetching total shares of parcel {} in plot {}",
            parcel_id, plot_id
        );

        let provider = self.contract.create_provider()?;
        let registry = ILandRegistry::new(*self.contract.contract_address(), &provider);

        let total = registry
            .getPlotAccountParcelTotalShares(U256::from(plot_id), U256::from(parcel_id))
            .call()
            .await
            .map_err(|e| LedgerError::read(e.to_string()))?;

        Ok(u256_to_decimal(total))
    }

    async fn get_user_parcels(
        &self,
        plot_id: u64,
        user: &str,
        parcel_filter: u64,
    ) -> LedgerResult<Vec<String>> {
        debug!("Fetching parcels of {} in plot {}", user, plot_id);

        let user = Self::parse_address(user, "user")?;
        let provider = self.contract.create_provider()?;
        let registry = ILandRegistry::new(*self.contract.contract_address(), &provider);

        let parcels = registry
            .getPlotAccountUserParcels(U256::from(plot_id), user, U256::from(parcel_filter))
            .call()
            .await
            .map_err(|e| LedgerError::read(e.to_string()))?;

        Ok(u256_vec_to_decimals(&parcels))
    }

    async fn get_ownership_basis_points(&self, plot_id: u64, user: &str) -> LedgerResult<u64> {
        debug!("Fetching ownership of {} in plot {}", user, plot_id);

        let user = Self::parse_address(user, "user")?;
        let provider = self.contract.create_provider()?;
        let registry = ILandRegistry::new(*self.contract.contract_address(), &provider);

        let basis_points = registry
            .getOwnershipPercentage(U256::from(plot_id), user)
            .call()
            .await
            .map_err(|e| LedgerError::read(e.to_string()))?;

        Ok(u256_to_id(basis_points))
    }

    async fn get_treasury_wallet(&self) -> LedgerResult<String> {
        debug!("Fetching treasury wallet address");

        let provider = self.contract.create_provider()?;
        let registry = ILandRegistry::new(*self.contract.contract_address(), &provider);

        let treasury = registry
            .treasuryWallet()
            .call()
            .await
            .map_err(|e| LedgerError::read(e.to_string()))?;

        Ok(address_to_string(treasury))
    }

    async fn get_token_uri(&self, token_id: u64) -> LedgerResult<String> {
        debug!("Fetching token URI for token {}", token_id);

        let provider = self.contract.create_provider()?;
        let registry = ILandRegistry::new(*self.contract.contract_address(), &provider);

        registry
            .getBlockParcelTokenURI(U256::from(token_id))
            .call()
            .await
            .map_err(|e| LedgerError::read(e.to_string()))
    }

    // ===== Write operations =====

    async fn create_token(
        &self,
        block_name: &str,
        parcel_name: &str,
        metadata_uri: &str,
        total_supply: &str,
    ) -> LedgerResult<TxReceipt> {
        debug!(
            "Creating token: block '{}', parcel '{}', supply {}",
            block_name, parcel_name, total_supply
        );

        let supply = U256::from_str(total_supply).map_err(|e| {
            LedgerError::invalid_input("total_supply", format!("not a decimal integer: {}", e))
        })?;

        let provider = self.contract.create_provider_with_signer()?;
        let registry = ILandRegistry::new(*self.contract.contract_address(), &provider);

        let pending_tx = registry
            .createBlockParcelToken(
                block_name.to_string(),
                parcel_name.to_string(),
                metadata_uri.to_string(),
                supply,
            )
            .send()
            .await
            .map_err(|e| LedgerError::transaction(e.to_string()))?;

        let receipt = pending_tx
            .get_receipt()
            .await
            .map_err(|e| LedgerError::transaction(e.to_string()))?;

        let receipt = Self::decode_receipt(&receipt);
        let has_event = receipt.token_id().is_some();
        Self::require_event(receipt, "TokenCreated", has_event)
    }

    async fn create_plot(
        &self,
        plot_name: &str,
        parcel_ids: &[u64],
        parcel_amounts: &[u64],
    ) -> LedgerResult<TxReceipt> {
        debug!(
            "Initiating plot '{}' with {} parcels",
            plot_name,
            parcel_ids.len()
        );

        if parcel_ids.is_empty() || parcel_ids.len() != parcel_amounts.len() {
            return Err(LedgerError::invalid_input(
                "parcel_ids",
                "parcel_ids and parcel_amounts must be non-empty and of equal length",
            ));
        }

        let ids: Vec<U256> = parcel_ids.iter().map(|id| U256::from(*id)).collect();
        let amounts: Vec<U256> = parcel_amounts.iter().map(|a| U256::from(*a)).collect();

        let provider = self.contract.create_provider_with_signer()?;
        let registry = ILandRegistry::new(*self.contract.contract_address(), &provider);

        let pending_tx = registry
            .plotInitiate(plot_name.to_string(), ids, amounts)
            .send()
            .await
            .map_err(|e| LedgerError::transaction(e.to_string()))?;

        let receipt = pending_tx
            .get_receipt()
            .await
            .map_err(|e| LedgerError::transaction(e.to_string()))?;

        let receipt = Self::decode_receipt(&receipt);
        let has_event = receipt.plot_id().is_some();
        Self::require_event(receipt, "PlotInitiated", has_event)
    }

    async fn request_plot_transfer(&self, plot_id: u64, to: &str) -> LedgerResult<TxReceipt> {
        debug!("Requesting whole-plot transfer of plot {} to {}", plot_id, to);

        let recipient = Self::parse_address(to, "to")?;

        let provider = self.contract.create_provider_with_signer()?;
        let registry = ILandRegistry::new(*self.contract.contract_address(), &provider);

        let pending_tx = registry
            .requestForWholePlotTransfer(U256::from(plot_id), recipient)
            .send()
            .await
            .map_err(|e| LedgerError::transaction(e.to_string()))?;

        let receipt = pending_tx
            .get_receipt()
            .await
            .map_err(|e| LedgerError::transaction(e.to_string()))?;

        let receipt = Self::decode_receipt(&receipt);
        let has_event = receipt.request_id().is_some();
        Self::require_event(receipt, "TransferRequestCreated", has_event)
    }

    async fn request_parcel_transfer(
        &self,
        parcel_id: u64,
        amount: u64,
        to: &str,
        plot_id: u64,
    ) -> LedgerResult<TxReceipt> {
        debug!(
            "Requesting parcel transfer: parcel {} amount {} of plot {} to {}",
            parcel_id, amount, plot_id, to
        );

        let recipient = Self::parse_address(to, "to")?;

        let provider = self.contract.create_provider_with_signer()?;
        let registry = ILandRegistry::new(*self.contract.contract_address(), &provider);

        let pending_tx = registry
            .requestForParcelTransfer(
                U256::from(parcel_id),
                U256::from(amount),
                recipient,
                U256::from(plot_id),
            )
            .send()
            .await
            .map_err(|e| LedgerError::transaction(e.to_string()))?;

        let receipt = pending_tx
            .get_receipt()
            .await
            .map_err(|e| LedgerError::transaction(e.to_string()))?;

        let receipt = Self::decode_receipt(&receipt);
        let has_event = receipt.request_id().is_some();
        Self::require_event(receipt, "TransferRequestCreated", has_event)
    }

    async fn approve_and_execute(
        &self,
        signer_address: &str,
        request_id: u64,
        role: ApprovalRole,
    ) -> LedgerResult<TxReceipt> {
        debug!(
            "Submitting {} approval for request {} by {}",
            role, request_id, signer_address
        );

        let signer = Self::parse_address(signer_address, "signer_address")?;

        let provider = self.contract.create_provider_with_signer()?;
        let registry = ILandRegistry::new(*self.contract.contract_address(), &provider);

        let pending_tx = registry
            .delegateApproveAndTransfer(signer, U256::from(request_id), role.code())
            .send()
            .await
            .map_err(|e| LedgerError::transaction(e.to_string()))?;

        let receipt = pending_tx
            .get_receipt()
            .await
            .map_err(|e| LedgerError::transaction(e.to_string()))?;

        let receipt = Self::decode_receipt(&receipt);
        if !receipt.status {
            return Err(LedgerError::transaction(format!(
                "transaction {} reverted",
                receipt.tx_hash
            )));
        }
        Ok(receipt)
    }
}
