//! Ankr Advanced API Types
//!
//! JSON-RPC envelopes and result payloads for the token endpoints.

use serde::{Deserialize, Serialize};

/// JSON-RPC 2.0 request envelope
#[derive(Debug, Clone, Serialize)]
pub struct RpcRequest<'a, P: Serialize> {
    pub id: u64,
    pub jsonrpc: &'static str,
    pub method: &'a str,
    pub params: P,
}

/// JSON-RPC 2.0 response envelope
#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse<T> {
    #[serde(default)]
    pub id: Option<u64>,
    pub result: Option<T>,
    pub error: Option<RpcErrorBody>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcErrorBody {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

/// Numeric fields Ankr returns either as JSON numbers or as strings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumberOrString {
    Number(f64),
    String(String),
}

impl NumberOrString {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            NumberOrString::Number(n) => Some(*n),
            NumberOrString::String(s) => s.trim().parse().ok(),
        }
    }
}

// ---------------------------------------------------------------------------
// Request params
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainParams<'a> {
    pub blockchain: &'a str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractParams<'a> {
    pub blockchain: &'a str,
    pub contract_address: &'a str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenHoldersParams<'a> {
    pub blockchain: &'a str,
    pub contract_address: &'a str,
    pub page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_token: Option<&'a str>,
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// `ankr_getCurrencies`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CurrenciesResult {
    #[serde(default)]
    pub currencies: Vec<Currency>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Currency {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub decimals: Option<NumberOrString>,
}

/// `ankr_getTokenPrice`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPriceResult {
    #[serde(default)]
    pub usd_price: Option<NumberOrString>,
}

/// `ankr_getTokenHolders`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenHoldersResult {
    #[serde(default)]
    pub token_decimals: Option<NumberOrString>,
    #[serde(default)]
    pub holders: Vec<AnkrHolder>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnkrHolder {
    #[serde(default)]
    pub holder_address: String,
    /// Decimal-adjusted balance as formatted by Ankr. Not used for snapshots.
    #[serde(default)]
    pub balance: Option<String>,
    #[serde(default)]
    pub balance_raw_integer: Option<String>,
}

/// `ankr_getTokenHoldersCount`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldersCountResult {
    #[serde(default)]
    pub latest_holders_count: Option<u64>,
    #[serde(default)]
    pub holder_count: Option<u64>,
}
