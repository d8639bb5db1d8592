//! Token metadata as reported by the currencies endpoint.

use serde::{Deserialize, Serialize};

use super::chain::Chain;

/// Name shown when the token is not listed upstream
pub const UNKNOWN_TOKEN_NAME: &str = "Unknown";
/// Symbol shown when the token is not listed upstream
pub const UNKNOWN_TOKEN_SYMBOL: &str = "???";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub contract: String,
    pub blockchain: Chain,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

impl TokenMetadata {
    /// "Name (SYMBOL)" for headers
    pub fn display_name(&self) -> String {
        format!("{} ({})", self.name, self.symbol)
    }
}

/// Display name for an optional metadata lookup, falling back to a shortened contract
pub fn display_name_or_contract(metadata: Option<&TokenMetadata>, contract: &str) -> String {
    match metadata {
        Some(meta) => meta.display_name(),
        None => {
            let short: String = contract.chars().take(20).collect();
            format!("{}...", short)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cake() -> TokenMetadata {
        TokenMetadata {
            contract: "0x0E09FaBB73Bd3Ade0a17ECC321fD13a19e81cE82".to_string(),
            blockchain: Chain::Bsc,
            name: "PancakeSwap Token".to_string(),
            symbol: "CAKE".to_string(),
            decimals: 18,
        }
    }

    #[test]
    fn test_display_name() {
        assert_eq!(cake().display_name(), "PancakeSwap Token (CAKE)");
    }

    #[test]
    fn test_display_name_or_contract() {
        let meta = cake();
        assert_eq!(
            display_name_or_contract(Some(&meta), &meta.contract),
            "PancakeSwap Token (CAKE)"
        );
        assert_eq!(
            display_name_or_contract(None, "0x0E09FaBB73Bd3Ade0a17ECC321fD13a19e81cE82"),
            "0x0E09FaBB73Bd3Ade0a..."
        );
    }
}
