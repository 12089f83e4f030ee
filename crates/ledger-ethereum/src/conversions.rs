//! Helper functions for Solidity to Rust type conversions

use alloy::primitives::{Address, U256};

/// Convert an Alloy address to a 0x-prefixed lowercase hex string
pub fn address_to_string(addr: Address) -> String {
    format!("0x{:x}", addr)
}

/// Convert a U256 to its full-width decimal string representation
pub fn u256_to_decimal(value: U256) -> String {
    value.to_string()
}

/// Convert a slice of U256 values to decimal strings
pub fn u256_vec_to_decimals(values: &[U256]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Convert a U256 sequence id to u64, capping at u64::MAX.
///
/// Ledger-assigned sequence ids never approach u64 width; the cap only
/// guards against a misbehaving node.
pub fn u256_to_id(value: U256) -> u64 {
    if value > U256::from(u64::MAX) {
        u64::MAX
    } else {
        value.to::<u64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_to_string() {
        let addr = Address::ZERO;
        assert_eq!(
            address_to_string(addr),
            "0x0000000000000000000000000000000000000000"
        );
    }

    #[test]
    fn test_u256_full_width_decimal() {
        let value = U256::MAX;
        let decimal = u256_to_decimal(value);
        // 2^256 - 1 is 78 decimal digits; no precision loss allowed.
        assert_eq!(decimal.len(), 78);
        assert!(decimal.starts_with("115792089237316195423570985008687907853"));
    }

    #[test]
    fn test_u256_to_id_caps() {
        assert_eq!(u256_to_id(U256::from(42u64)), 42);
        assert_eq!(u256_to_id(U256::MAX), u64::MAX);
    }
}
