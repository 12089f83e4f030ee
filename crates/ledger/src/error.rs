//! Error types for ledger operations

use thiserror::Error;

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Errors raised by the ledger facade
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Invalid input parameters (caller-fixable)
    #[error("Invalid {parameter}: {message}")]
    InvalidInput { parameter: String, message: String },

    /// Read call failed (node unreachable, call reverted)
    #[error("Ledger read failed: {message}")]
    Read { message: String },

    /// Transaction submission reverted or failed to confirm
    #[error("Ledger transaction failed: {message}")]
    Transaction {
        message: String,
        /// Provider error code, when one was reported
        code: Option<String>,
    },

    /// A confirmed receipt did not carry the expected event
    #[error("Transaction {tx_hash} confirmed but no {event} event was emitted")]
    MissingEvent { event: String, tx_hash: String },

    /// Resource not found on the ledger
    #[error("{resource} not found: {id}")]
    NotFound { resource: String, id: String },

    /// Client configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl LedgerError {
    /// Create an invalid input error
    pub fn invalid_input(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Create a read failure
    pub fn read(message: impl Into<String>) -> Self {
        Self::Read {
            message: message.into(),
        }
    }

    /// Create a transaction failure without a provider code
    pub fn transaction(message: impl Into<String>) -> Self {
        Self::Transaction {
            message: message.into(),
            code: None,
        }
    }

    /// Create a not found error
    pub fn not_found(resource: impl Into<String>, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.to_string(),
        }
    }
}
