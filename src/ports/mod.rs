//! Ports Layer - Trait definitions for external dependencies
//!
//! The token data port abstracts the blockchain-data API so the snapshot
//! collector can be driven by the Ankr client in production and by scripted
//! mocks in tests.

pub mod mocks;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Chain, TokenMetadata};

/// Upstream API error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UpstreamError {
    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("HTTP status {status}: {body}")]
    StatusError { status: u16, body: String },

    #[error("Ankr API error: {message} (code: {code})")]
    RpcError { code: i64, message: String },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Rate limited, try again later")]
    RateLimited,

    #[error("Request timed out")]
    Timeout,

    #[error("Token decimals unavailable for {0}")]
    MissingDecimals(String),
}

impl UpstreamError {
    /// Errors the client retries with backoff
    pub fn is_retryable(&self) -> bool {
        match self {
            UpstreamError::HttpError(_) | UpstreamError::RateLimited | UpstreamError::Timeout => true,
            UpstreamError::StatusError { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UpstreamError::Timeout
        } else if err.is_decode() {
            UpstreamError::ParseError(err.to_string())
        } else {
            UpstreamError::HttpError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for UpstreamError {
    fn from(err: serde_json::Error) -> Self {
        UpstreamError::ParseError(err.to_string())
    }
}

/// A holder entry exactly as returned upstream, before decimal shifting and labeling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawHolder {
    pub address: String,
    pub balance_raw: String,
}

impl RawHolder {
    pub fn new(address: impl Into<String>, balance_raw: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            balance_raw: balance_raw.into(),
        }
    }
}

/// One page of the paged holder list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HolderPage {
    pub holders: Vec<RawHolder>,
    /// Decimals reported alongside the page, if any
    pub token_decimals: Option<u8>,
    /// Cursor of the next page; `None` when upstream reports no more pages
    pub next_page_token: Option<String>,
}

impl HolderPage {
    /// True when pagination should stop after this page
    pub fn is_last(&self) -> bool {
        self.holders.is_empty()
            || self
                .next_page_token
                .as_deref()
                .map_or(true, |token| token.is_empty())
    }
}

/// Read-only token data source
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenDataPort: Send + Sync {
    /// Name, symbol and decimals; `Ok(None)` when the token is not listed
    async fn get_token_metadata(
        &self,
        contract: &str,
        chain: Chain,
    ) -> Result<Option<TokenMetadata>, UpstreamError>;

    /// USD price; `Ok(None)` when no price is available
    async fn get_token_price(&self, contract: &str, chain: Chain)
        -> Result<Option<f64>, UpstreamError>;

    /// Fetch one page of holders. `page_token = None` requests the first page.
    async fn get_token_holders(
        &self,
        contract: &str,
        chain: Chain,
        page_size: u32,
        page_token: Option<String>,
    ) -> Result<HolderPage, UpstreamError>;

    /// Holder count as reported by the API's own index
    async fn get_token_holders_count(&self, contract: &str, chain: Chain)
        -> Result<u64, UpstreamError>;
}
