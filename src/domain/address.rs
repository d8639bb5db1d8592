//! EVM address validation and normalization.

use super::ValidationError;

/// Length of an address without the `0x` prefix
pub const ADDRESS_HEX_LEN: usize = 40;

/// Lowercase form used for comparisons. Checksums are ignored.
pub fn normalize_address(address: &str) -> String {
    address.trim().to_ascii_lowercase()
}

/// Check that `address` is `0x` followed by 40 hex characters (any case)
pub fn is_valid_address(address: &str) -> bool {
    let Some(hex) = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
    else {
        return false;
    };

    hex.len() == ADDRESS_HEX_LEN && hex.chars().all(|c| c.is_ascii_hexdigit())
}

/// Validate a token contract address before any upstream call is made
pub fn validate_contract(contract: &str) -> Result<&str, ValidationError> {
    let trimmed = contract.trim();
    if is_valid_address(trimmed) {
        Ok(trimmed)
    } else {
        Err(ValidationError::MalformedAddress(contract.to_string()))
    }
}
