//! Ankr Client
//!
//! JSON-RPC client for the Ankr multichain token API. Retries rate limits,
//! server errors and transport failures with exponential backoff.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::types::{
    ChainParams, ContractParams, CurrenciesResult, Currency, HoldersCountResult, RpcRequest,
    RpcResponse, TokenHoldersParams, TokenHoldersResult, TokenPriceResult,
};
use crate::domain::token::{UNKNOWN_TOKEN_NAME, UNKNOWN_TOKEN_SYMBOL};
use crate::domain::{Chain, TokenMetadata};
use crate::ports::{HolderPage, RawHolder, TokenDataPort, UpstreamError};

/// Public multichain endpoint; an API key is appended as a path segment
pub const DEFAULT_RPC_URL: &str = "https://rpc.ankr.com/multichain";

/// Largest page the holders endpoint accepts
pub const MAX_PAGE_SIZE: u32 = 10_000;

/// Configuration for the AnkrClient
#[derive(Debug, Clone)]
pub struct AnkrConfig {
    /// Multichain RPC endpoint URL
    pub rpc_url: String,
    /// Optional API key
    pub api_key: Option<String>,
    /// Request timeout
    pub timeout: Duration,
    /// Number of attempts per request
    pub max_retries: u32,
    /// Base delay for exponential backoff (milliseconds)
    pub retry_base_delay_ms: u64,
    /// Holders per page for full snapshots
    pub page_size: u32,
}

impl Default for AnkrConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            api_key: None,
            // Ankr can be slow for large holder pages
            timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_base_delay_ms: 500,
            page_size: MAX_PAGE_SIZE,
        }
    }
}

impl AnkrConfig {
    /// Create config with a custom RPC URL
    pub fn with_rpc_url(rpc_url: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            ..Default::default()
        }
    }

    /// Full endpoint URL including the API key, if any
    pub fn endpoint(&self) -> String {
        let base = self.rpc_url.trim_end_matches('/');
        match self.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() && !base.ends_with(key) => format!("{}/{}", base, key),
            _ => base.to_string(),
        }
    }
}

/// Client for the Ankr token API
#[derive(Debug, Clone)]
pub struct AnkrClient {
    config: AnkrConfig,
    endpoint: String,
    http: Client,
    request_id: Arc<AtomicU64>,
}

impl AnkrClient {
    /// Create a new AnkrClient with default configuration
    pub fn new() -> Result<Self, UpstreamError> {
        Self::with_config(AnkrConfig::default())
    }

    /// Create a new AnkrClient with custom configuration
    pub fn with_config(config: AnkrConfig) -> Result<Self, UpstreamError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()?;
        let endpoint = config.endpoint();

        Ok(Self {
            config,
            endpoint,
            http,
            request_id: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Configured page size for paginated calls
    pub fn page_size(&self) -> u32 {
        self.config.page_size
    }

    /// Get the configured RPC URL (without API key)
    pub fn rpc_url(&self) -> &str {
        &self.config.rpc_url
    }

    /// List every currency Ankr knows on `chain`
    pub async fn get_currencies(&self, chain: Chain) -> Result<Vec<Currency>, UpstreamError> {
        let result: CurrenciesResult = self
            .call("ankr_getCurrencies", ChainParams { blockchain: chain.as_str() })
            .await?;
        Ok(result.currencies)
    }

    /// Make a JSON-RPC call and unwrap its result
    async fn call<P, R>(&self, method: &str, params: P) -> Result<R, UpstreamError>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let request = RpcRequest {
            id: self.request_id.fetch_add(1, Ordering::Relaxed) + 1,
            jsonrpc: "2.0",
            method,
            params,
        };

        tracing::debug!(method, id = request.id, "Ankr request");

        let response: RpcResponse<R> = self
            .execute_with_retry(|| self.http.post(&self.endpoint).json(&request).send())
            .await?;

        unwrap_rpc(method, response)
    }

    /// Execute request with retry logic and exponential backoff
    async fn execute_with_retry<T, F, Fut>(&self, request_fn: F) -> Result<T, UpstreamError>
    where
        T: DeserializeOwned,
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<reqwest::Response, reqwest::Error>>,
    {
        let mut last_error = None;

        for attempt in 0..self.config.max_retries {
            match request_fn().await {
                Ok(response) => {
                    let status = response.status();

                    if status == StatusCode::TOO_MANY_REQUESTS {
                        let backoff = self.backoff(2u64.checked_pow(attempt + 1).unwrap_or(u64::MAX));
                        tracing::warn!(
                            "Rate limited (429), backing off for {:?} (attempt {}/{})",
                            backoff,
                            attempt + 1,
                            self.config.max_retries
                        );
                        last_error = Some(UpstreamError::RateLimited);
                        tokio::time::sleep(backoff).await;
                        continue;
                    }

                    if status.is_server_error() {
                        let body = response.text().await.unwrap_or_default();
                        let backoff = self.backoff(attempt as u64 + 1);
                        tracing::warn!(
                            "Server error {}, retrying in {:?} (attempt {}/{})",
                            status,
                            backoff,
                            attempt + 1,
                            self.config.max_retries
                        );
                        last_error = Some(UpstreamError::StatusError {
                            status: status.as_u16(),
                            body,
                        });
                        tokio::time::sleep(backoff).await;
                        continue;
                    }

                    if !status.is_success() {
                        let body = response.text().await.unwrap_or_default();
                        return Err(UpstreamError::StatusError {
                            status: status.as_u16(),
                            body,
                        });
                    }

                    let bytes = response.bytes().await?;
                    return serde_json::from_slice(&bytes).map_err(|e| {
                        UpstreamError::ParseError(format!("Failed to parse JSON: {}", e))
                    });
                }
                Err(e) => {
                    let err = UpstreamError::from(e);
                    let backoff = self.backoff(attempt as u64 + 1);
                    tracing::warn!(
                        "Request failed: {}, retrying in {:?} (attempt {}/{})",
                        err,
                        backoff,
                        attempt + 1,
                        self.config.max_retries
                    );
                    last_error = Some(err);
                    tokio::time::sleep(backoff).await;
                }
            }
        }

        Err(last_error.unwrap_or_else(|| UpstreamError::HttpError("Max retries exceeded".into())))
    }

    /// Base delay times `factor`, plus up to 10% jitter
    fn backoff(&self, factor: u64) -> Duration {
        let base = self.config.retry_base_delay_ms.saturating_mul(factor);
        let jitter = rand::thread_rng().gen_range(0..=base / 10);
        Duration::from_millis(base.saturating_add(jitter))
    }
}

#[async_trait]
impl TokenDataPort for AnkrClient {
    async fn get_token_metadata(
        &self,
        contract: &str,
        chain: Chain,
    ) -> Result<Option<TokenMetadata>, UpstreamError> {
        let currencies = self.get_currencies(chain).await?;
        let metadata = find_currency(contract, chain, &currencies);
        if metadata.is_none() {
            tracing::debug!("Token {} not listed in {} currencies", contract, chain);
        }
        Ok(metadata)
    }

    async fn get_token_price(&self, contract: &str, chain: Chain) -> Result<Option<f64>, UpstreamError> {
        let result: TokenPriceResult = self
            .call(
                "ankr_getTokenPrice",
                ContractParams {
                    blockchain: chain.as_str(),
                    contract_address: contract,
                },
            )
            .await?;
        Ok(parse_price(&result))
    }

    async fn get_token_holders(
        &self,
        contract: &str,
        chain: Chain,
        page_size: u32,
        page_token: Option<String>,
    ) -> Result<HolderPage, UpstreamError> {
        let result: TokenHoldersResult = self
            .call(
                "ankr_getTokenHolders",
                TokenHoldersParams {
                    blockchain: chain.as_str(),
                    contract_address: contract,
                    page_size: page_size.clamp(1, MAX_PAGE_SIZE),
                    page_token: page_token.as_deref().filter(|t| !t.is_empty()),
                },
            )
            .await?;
        parse_holders_page(result)
    }

    async fn get_token_holders_count(&self, contract: &str, chain: Chain) -> Result<u64, UpstreamError> {
        let result: HoldersCountResult = self
            .call(
                "ankr_getTokenHoldersCount",
                ContractParams {
                    blockchain: chain.as_str(),
                    contract_address: contract,
                },
            )
            .await?;
        Ok(result
            .latest_holders_count
            .or(result.holder_count)
            .unwrap_or(0))
    }
}

/// Turn a JSON-RPC envelope into its result or an upstream error
fn unwrap_rpc<R>(method: &str, response: RpcResponse<R>) -> Result<R, UpstreamError> {
    if let Some(err) = response.error {
        tracing::error!("Ankr API error on {}: {} ({})", method, err.message, err.code);
        return Err(UpstreamError::RpcError {
            code: err.code,
            message: err.message,
        });
    }

    response
        .result
        .ok_or_else(|| UpstreamError::ParseError(format!("No result in {} response", method)))
}

/// Find `contract` (case-insensitive) in a currencies listing
fn find_currency(contract: &str, chain: Chain, currencies: &[Currency]) -> Option<TokenMetadata> {
    let currency = currencies.iter().find(|c| {
        c.address
            .as_deref()
            .is_some_and(|address| address.eq_ignore_ascii_case(contract))
    })?;

    let decimals = currency
        .decimals
        .as_ref()
        .and_then(|d| d.as_f64())
        .filter(|d| (0.0..=u8::MAX as f64).contains(d))
        .map(|d| d as u8)
        .unwrap_or(18);

    Some(TokenMetadata {
        contract: contract.to_string(),
        blockchain: chain,
        name: currency.name.clone().unwrap_or_else(|| UNKNOWN_TOKEN_NAME.to_string()),
        symbol: currency.symbol.clone().unwrap_or_else(|| UNKNOWN_TOKEN_SYMBOL.to_string()),
        decimals,
    })
}

/// Zero or missing prices mean "no price"
fn parse_price(result: &TokenPriceResult) -> Option<f64> {
    result
        .usd_price
        .as_ref()
        .and_then(|p| p.as_f64())
        .filter(|p| p.is_finite() && *p > 0.0)
}

fn parse_holders_page(result: TokenHoldersResult) -> Result<HolderPage, UpstreamError> {
    let token_decimals = match result.token_decimals {
        Some(d) => {
            let value = d
                .as_f64()
                .filter(|v| (0.0..=u8::MAX as f64).contains(v))
                .ok_or_else(|| UpstreamError::ParseError(format!("Invalid tokenDecimals: {:?}", d)))?;
            Some(value as u8)
        }
        None => None,
    };

    let holders = result
        .holders
        .into_iter()
        .map(|h| RawHolder {
            address: h.holder_address,
            balance_raw: h.balance_raw_integer.unwrap_or_else(|| "0".to_string()),
        })
        .collect();

    Ok(HolderPage {
        holders,
        token_decimals,
        next_page_token: result.next_page_token.filter(|t| !t.is_empty()),
    })
}

impl Default for AnkrClient {
    fn default() -> Self {
        Self::new().expect("Failed to create default AnkrClient")
    }
}
