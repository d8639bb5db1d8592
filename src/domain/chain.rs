//! Supported Chains
//!
//! Blockchain identifiers accepted by the Ankr multichain API.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// A blockchain supported by the holder endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    Bsc,
    Eth,
    Polygon,
    Arbitrum,
    Base,
    Avalanche,
}

impl Chain {
    /// Every supported chain, in display order
    pub const ALL: [Chain; 6] = [
        Chain::Bsc,
        Chain::Eth,
        Chain::Polygon,
        Chain::Arbitrum,
        Chain::Base,
        Chain::Avalanche,
    ];

    /// Identifier used in API requests and file names
    pub fn as_str(&self) -> &'static str {
        match self {
            Chain::Bsc => "bsc",
            Chain::Eth => "eth",
            Chain::Polygon => "polygon",
            Chain::Arbitrum => "arbitrum",
            Chain::Base => "base",
            Chain::Avalanche => "avalanche",
        }
    }

    /// Comma-separated list of supported identifiers, for error messages and help text
    pub fn supported_list() -> String {
        Self::ALL
            .iter()
            .map(Chain::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Default for Chain {
    fn default() -> Self {
        Chain::Bsc
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Chain {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|chain| chain.as_str() == normalized)
            .ok_or_else(|| ValidationError::UnsupportedChain(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_supported_chains() {
        for chain in Chain::ALL {
            assert_eq!(chain.as_str().parse::<Chain>().unwrap(), chain);
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("BSC".parse::<Chain>().unwrap(), Chain::Bsc);
        assert_eq!(" Eth ".parse::<Chain>().unwrap(), Chain::Eth);
    }

    #[test]
    fn test_parse_unsupported_chain() {
        let err = "solana".parse::<Chain>().unwrap_err();
        assert!(matches!(err, ValidationError::UnsupportedChain(ref c) if c == "solana"));
        assert!(err.to_string().contains("solana"));
    }

    #[test]
    fn test_supported_list() {
        assert_eq!(
            Chain::supported_list(),
            "bsc, eth, polygon, arbitrum, base, avalanche"
        );
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&Chain::Polygon).unwrap();
        assert_eq!(json, "\"polygon\"");
        let chain: Chain = serde_json::from_str("\"avalanche\"").unwrap();
        assert_eq!(chain, Chain::Avalanche);
    }
}
