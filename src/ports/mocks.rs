//! Scripted token data source for deterministic tests without network calls.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use async_trait::async_trait;

use crate::domain::{Chain, TokenMetadata};
use super::{HolderPage, RawHolder, TokenDataPort, UpstreamError};

/// Cursor used by `ScriptedTokenData::with_pages` for the n-th page (1-based)
pub fn page_cursor(page_number: usize) -> Option<String> {
    if page_number <= 1 {
        None
    } else {
        Some(format!("page-{}", page_number))
    }
}

/// Mock token data port that serves pages by cursor and records every request
#[derive(Debug, Default, Clone)]
pub struct ScriptedTokenData {
    metadata: Option<TokenMetadata>,
    metadata_error: Option<UpstreamError>,
    price: Option<f64>,
    price_error: Option<UpstreamError>,
    holders_count: u64,
    pages: Arc<Mutex<HashMap<Option<String>, Result<HolderPage, UpstreamError>>>>,
    page_requests: Arc<Mutex<Vec<(Option<String>, u32)>>>,
}

impl ScriptedTokenData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the metadata returned for any contract
    pub fn with_metadata(mut self, metadata: TokenMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Builder method to make the metadata call fail
    pub fn with_metadata_error(mut self, err: UpstreamError) -> Self {
        self.metadata_error = Some(err);
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    /// Builder method to make the price call fail
    pub fn with_price_error(mut self, err: UpstreamError) -> Self {
        self.price_error = Some(err);
        self
    }

    pub fn with_holders_count(mut self, count: u64) -> Self {
        self.holders_count = count;
        self
    }

    /// Builder method to serve `page` when `cursor` is requested
    pub fn with_page(self, cursor: Option<String>, page: HolderPage) -> Self {
        self.pages.lock().unwrap().insert(cursor, Ok(page));
        self
    }

    /// Chain `pages` together with cursors from `page_cursor`, followed by a
    /// terminal empty page
    pub fn with_pages(mut self, decimals: u8, pages: Vec<Vec<RawHolder>>) -> Self {
        let count = pages.len();
        for (index, holders) in pages.into_iter().enumerate() {
            let page_number = index + 1;
            self = self.with_page(
                page_cursor(page_number),
                HolderPage {
                    holders,
                    token_decimals: Some(decimals),
                    next_page_token: page_cursor(page_number + 1),
                },
            );
        }
        self.with_page(
            page_cursor(count + 1),
            HolderPage {
                holders: Vec::new(),
                token_decimals: Some(decimals),
                next_page_token: None,
            },
        )
    }

    /// Builder method to make the request for the n-th page (1-based) fail
    pub fn fail_at(self, page_number: usize, err: UpstreamError) -> Self {
        self.pages
            .lock()
            .unwrap()
            .insert(page_cursor(page_number), Err(err));
        self
    }

    /// Every page request as `(cursor, page_size)`, in order
    pub fn page_requests(&self) -> Vec<(Option<String>, u32)> {
        self.page_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TokenDataPort for ScriptedTokenData {
    async fn get_token_metadata(
        &self,
        _contract: &str,
        _chain: Chain,
    ) -> Result<Option<TokenMetadata>, UpstreamError> {
        match &self.metadata_error {
            Some(err) => Err(err.clone()),
            None => Ok(self.metadata.clone()),
        }
    }

    async fn get_token_price(&self, _contract: &str, _chain: Chain) -> Result<Option<f64>, UpstreamError> {
        match &self.price_error {
            Some(err) => Err(err.clone()),
            None => Ok(self.price),
        }
    }

    async fn get_token_holders(
        &self,
        _contract: &str,
        _chain: Chain,
        page_size: u32,
        page_token: Option<String>,
    ) -> Result<HolderPage, UpstreamError> {
        self.page_requests
            .lock()
            .unwrap()
            .push((page_token.clone(), page_size));

        let response = self
            .pages
            .lock()
            .unwrap()
            .get(&page_token)
            .cloned()
            .unwrap_or_else(|| {
                Err(UpstreamError::RpcError {
                    code: -32602,
                    message: format!("unknown page token {:?}", page_token),
                })
            });

        // Honor the requested page size the way the API does
        response.map(|mut page| {
            page.holders.truncate(page_size as usize);
            page
        })
    }

    async fn get_token_holders_count(&self, _contract: &str, _chain: Chain) -> Result<u64, UpstreamError> {
        Ok(self.holders_count)
    }
}
