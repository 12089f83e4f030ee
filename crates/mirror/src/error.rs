//! Error types for mirror operations

use landchain_ledger::LedgerError;
use thiserror::Error;

/// Result type for mirror operations
pub type MirrorResult<T> = Result<T, MirrorError>;

/// Errors raised by the mirror store, reconciliation engine and approval
/// aggregator
#[derive(Error, Debug)]
pub enum MirrorError {
    /// Database connection or statement error
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Invalid input parameters (caller-fixable)
    #[error("Invalid {parameter}: {message}")]
    InvalidInput { parameter: String, message: String },

    /// Referenced mirror row absent
    #[error("{resource} not found: {id}")]
    NotFound { resource: String, id: String },

    /// Primary-key collision on insert
    #[error("Duplicate key in {table}: {id}")]
    DuplicateKey { table: String, id: i64 },

    /// Table name not one of the three mirror tables
    #[error("Unknown mirror table: {0}")]
    UnknownTable(String),

    /// Underlying ledger failure during reconciliation
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl MirrorError {
    /// Create an invalid input error
    pub fn invalid_input(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            parameter: parameter.into(),
            message: message.into(),
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
