//! Configuration for the Ethereum ledger client

use landchain_ledger::LedgerError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the Ethereum land-registry client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EthereumLedgerConfig {
    /// RPC URL for the EVM node
    /// Example: "https://base-sepolia-rpc.publicnode.com"
    pub rpc_url: String,

    /// Chain ID (84532 = Base Sepolia, 8453 = Base, 1 = mainnet, ...)
    pub chain_id: u64,

    /// Deployed land-registry contract address
    /// Must be a valid Ethereum address (0x-prefixed, 42 characters)
    pub contract_address: String,

    /// Private key for signing transactions (optional for read-only use)
    /// Format: 0x-prefixed hex string
    pub private_key: Option<String>,

    /// Number of confirmations to wait for (default 1)
    pub confirmation_blocks: u64,
}

impl Default for EthereumLedgerConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            chain_id: 31337, // Local anvil/hardhat
            contract_address: String::new(),
            private_key: None,
            confirmation_blocks: 1,
        }
    }
}

impl EthereumLedgerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load configuration from a TOML string
    pub fn from_toml_str(toml: &str) -> Result<Self, anyhow::Error> {
        let config: Self = toml::from_str(toml)?;
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("Configuration validation failed: {}", e))?;
        Ok(config)
    }

    /// Load configuration from environment variables.
    ///
    /// Reads `RPC_URL`, `CHAIN_ID`, `CONTRACT_ADDRESS`, `PRIVATE_KEY` and
    /// `CONFIRMATION_BLOCKS`, falling back to defaults where unset.
    pub fn from_env() -> Result<Self, LedgerError> {
        let defaults = Self::default();
        let config = Self {
            rpc_url: std::env::var("RPC_URL").unwrap_or(defaults.rpc_url),
            chain_id: std::env::var("CHAIN_ID")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.chain_id),
            contract_address: std::env::var("CONTRACT_ADDRESS")
                .map_err(|_| LedgerError::Configuration("CONTRACT_ADDRESS must be set".into()))?,
            private_key: std::env::var("PRIVATE_KEY").ok(),
            confirmation_blocks: std::env::var("CONFIRMATION_BLOCKS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.confirmation_blocks),
        };
        config.validate().map_err(LedgerError::Configuration)?;
        Ok(config)
    }

    /// Validate configuration
    ///
    /// Returns `Ok(())` if valid, otherwise returns an error message
    pub fn validate(&self) -> Result<(), String> {
        if self.rpc_url.is_empty() {
            return Err("rpc_url cannot be empty".to_string());
        }
        if !self.rpc_url.starts_with("http://") && !self.rpc_url.starts_with("https://") {
            return Err("rpc_url must start with http:// or https://".to_string());
        }

        if self.contract_address.is_empty() {
            return Err("contract_address cannot be empty".to_string());
        }
        if !self.contract_address.starts_with("0x") || self.contract_address.len() != 42 {
            return Err(
                "contract_address must be a 0x-prefixed 42-character address".to_string(),
            );
        }

        if let Some(ref key) = self.private_key {
            if !key.starts_with("0x") || key.len() != 66 {
                return Err("private_key must be a 0x-prefixed 66-character hex string".to_string());
            }
        }

        if self.confirmation_blocks == 0 {
            return Err("confirmation_blocks must be at least 1".to_string());
        }

        Ok(())
    }
}
