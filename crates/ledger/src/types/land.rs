//! Land token types

use serde::{Deserialize, Serialize};

/// One fungible land token as read from the ledger.
///
/// Bulk reads return these in ledger enumeration order without native ids;
/// the mirror assigns positional ids during resync. Value-bearing numerics
/// are decimal strings to preserve full uint256 width.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandInfo {
    /// Name of the block this parcel belongs to
    pub block_name: String,

    /// Parcel name within the block
    pub parcel_name: String,

    /// URI pointing to token metadata
    pub metadata_uri: String,

    /// Total supply of the token, decimal string
    pub total_supply: String,

    /// Plot ids this token's supply is allocated across, decimal strings
    pub plot_allocation: Vec<String>,
}
