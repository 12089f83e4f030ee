//! Contract client managing providers for the land-registry contract

use crate::config::EthereumLedgerConfig;
use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::providers::{Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use landchain_ledger::{LedgerError, LedgerResult};
use std::str::FromStr;

/// Client holding the registry contract's connection details.
///
/// Providers are built per call and never cached; the client is cheap to
/// share behind an `Arc`.
pub struct ContractClient {
    contract_address: Address,
    rpc_url: String,
    private_key: Option<String>,
    config: EthereumLedgerConfig,
}

impl ContractClient {
    /// Creates a new contract client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the contract address or the private key (when
    /// provided) fails to parse.
    pub fn new(config: EthereumLedgerConfig) -> LedgerResult<Self> {
        let contract_address = Address::from_str(&config.contract_address).map_err(|e| {
            LedgerError::Configuration(format!(
                "Invalid contract address '{}': {}",
                config.contract_address, e
            ))
        })?;

        if let Some(ref private_key) = config.private_key {
            let _ = private_key.parse::<PrivateKeySigner>().map_err(|e| {
                LedgerError::Configuration(format!("Invalid private key: {}", e))
            })?;
        }

        Ok(Self {
            contract_address,
            rpc_url: config.rpc_url.clone(),
            private_key: config.private_key.clone(),
            config,
        })
    }

    /// Returns the registry contract address
    pub fn contract_address(&self) -> &Address {
        &self.contract_address
    }

    /// Returns the chain ID from configuration
    pub fn chain_id(&self) -> u64 {
        self.config.chain_id
    }

    /// Checks whether the client can sign transactions
    pub fn has_wallet(&self) -> bool {
        self.private_key.is_some()
    }

    /// Returns the RPC URL
    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    /// Create a read-only provider for contract calls.
    pub fn create_provider(&self) -> LedgerResult<impl Provider> {
        let rpc_url = self
            .rpc_url
            .parse()
            .map_err(|e| LedgerError::Configuration(format!("Invalid RPC URL: {}", e)))?;

        Ok(ProviderBuilder::new().connect_http(rpc_url))
    }

    /// Create a provider with wallet for sending transactions.
    ///
    /// # Errors
    ///
    /// Returns an error if no private key is configured or the key fails to
    /// parse.
    pub fn create_provider_with_signer(&self) -> LedgerResult<impl Provider> {
        let private_key = self.private_key.as_ref().ok_or_else(|| {
            LedgerError::Configuration("No private key configured for signing".to_string())
        })?;

        let signer = private_key
            .parse::<PrivateKeySigner>()
            .map_err(|e| LedgerError::Configuration(format!("Invalid private key: {}", e)))?;

        let wallet = EthereumWallet::from(signer);

        let rpc_url = self
            .rpc_url
            .parse()
            .map_err(|e| LedgerError::Configuration(format!("Invalid RPC URL: {}", e)))?;

        Ok(ProviderBuilder::new().wallet(wallet).connect_http(rpc_url))
    }
}
