//! Basic info and top holders queries: single-page reads, no pagination.

use super::collector::{build_records, fetch_metadata, fetch_price};
use super::MonitorError;
use crate::adapters::ankr::MAX_PAGE_SIZE;
use crate::domain::{validate_contract, Chain, HolderRecord, LabelTable, TokenMetadata};
use crate::ports::{TokenDataPort, UpstreamError};

/// Holders shown by the basic info query
pub const BASIC_INFO_HOLDERS: u32 = 5;
/// Default row count for the top holders query
pub const DEFAULT_TOP_HOLDERS: u32 = 20;

/// Metadata, price and the head of the holder list
#[derive(Debug, Clone, PartialEq)]
pub struct TokenOverview {
    pub contract: String,
    pub chain: Chain,
    pub metadata: Option<TokenMetadata>,
    pub price_usd: Option<f64>,
    pub top_holders: Vec<HolderRecord>,
}

/// Read-only token queries
#[derive(Debug, Clone)]
pub struct TokenQueries<P: TokenDataPort> {
    port: P,
    labels: LabelTable,
}

impl<P: TokenDataPort> TokenQueries<P> {
    pub fn new(port: P, labels: LabelTable) -> Self {
        Self { port, labels }
    }

    /// Metadata, price and the top 5 holders
    pub async fn basic_info(&self, contract: &str, chain: Chain) -> Result<TokenOverview, MonitorError> {
        self.overview(contract, chain, BASIC_INFO_HOLDERS).await
    }

    /// Metadata, price and the top `limit` holders
    pub async fn top_holders(
        &self,
        contract: &str,
        chain: Chain,
        limit: u32,
    ) -> Result<TokenOverview, MonitorError> {
        self.overview(contract, chain, limit).await
    }

    /// Number of holders in the API's index, for display only
    pub async fn holders_count(&self, contract: &str, chain: Chain) -> Result<u64, MonitorError> {
        let contract = validate_contract(contract)?;
        Ok(self.port.get_token_holders_count(contract, chain).await?)
    }

    async fn overview(&self, contract: &str, chain: Chain, limit: u32) -> Result<TokenOverview, MonitorError> {
        let contract = validate_contract(contract)?;
        let limit = limit.clamp(1, MAX_PAGE_SIZE);

        let metadata = fetch_metadata(&self.port, contract, chain).await;
        let price_usd = fetch_price(&self.port, contract, chain).await;
        let mut page = self
            .port
            .get_token_holders(contract, chain, limit, None)
            .await?;
        page.holders.truncate(limit as usize);

        let top_holders = if page.holders.is_empty() {
            Vec::new()
        } else {
            let decimals = metadata
                .as_ref()
                .map(|m| m.decimals)
                .or(page.token_decimals)
                .ok_or_else(|| UpstreamError::MissingDecimals(contract.to_string()))?;
            build_records(page.holders, decimals, &self.labels)?
        };

        Ok(TokenOverview {
            contract: contract.to_string(),
            chain,
            metadata,
            price_usd,
            top_holders,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ValidationError;
    use crate::ports::mocks::ScriptedTokenData;
    use crate::ports::RawHolder;

    const CONTRACT: &str = "0x000Ae314E2A2172a039B26378814C252734f556A";

    fn holders(n: usize) -> Vec<RawHolder> {
        (0..n)
            .map(|i| RawHolder::new(format!("0x{:040x}", i + 1), format!("{}000000000000000000", n - i)))
            .collect()
    }

    fn aster() -> TokenMetadata {
        TokenMetadata {
            contract: CONTRACT.to_string(),
            blockchain: Chain::Bsc,
            name: "Aster".to_string(),
            symbol: "ASTER".to_string(),
            decimals: 18,
        }
    }

    #[tokio::test]
    async fn test_basic_info_requests_five_holders() {
        let mock = ScriptedTokenData::new()
            .with_metadata(aster())
            .with_price(1.75)
            .with_pages(18, vec![holders(30)]);
        let queries = TokenQueries::new(mock.clone(), LabelTable::known());

        let overview = queries.basic_info(CONTRACT, Chain::Bsc).await.unwrap();

        assert_eq!(overview.top_holders.len(), 5);
        assert_eq!(overview.top_holders[0].balance(), "30");
        assert_eq!(overview.price_usd, Some(1.75));
        assert_eq!(overview.metadata.unwrap().symbol, "ASTER");
        assert_eq!(mock.page_requests(), vec![(None, 5)]);
    }

    #[tokio::test]
    async fn test_top_holders_labels() {
        let mock = ScriptedTokenData::new().with_pages(
            18,
            vec![vec![
                RawHolder::new("0xF977814e90dA44bFA03b6295A0616a897441aceC", "7000000000000000000"),
                RawHolder::new("0x5555555555555555555555555555555555555555", "1000000000000000000"),
            ]],
        );
        let queries = TokenQueries::new(mock, LabelTable::known());

        let overview = queries.top_holders(CONTRACT, Chain::Bsc, 20).await.unwrap();

        assert!(overview.metadata.is_none());
        assert_eq!(overview.top_holders.len(), 2);
        assert_eq!(overview.top_holders[0].label(), "Binance Hot Wallet");
        assert_eq!(overview.top_holders[1].label(), "");
    }

    #[tokio::test]
    async fn test_price_error_is_not_fatal() {
        let mock = ScriptedTokenData::new()
            .with_price_error(UpstreamError::Timeout)
            .with_pages(18, vec![holders(1)]);
        let queries = TokenQueries::new(mock, LabelTable::known());

        let overview = queries.basic_info(CONTRACT, Chain::Bsc).await.unwrap();
        assert_eq!(overview.price_usd, None);
    }

    #[tokio::test]
    async fn test_metadata_error_is_not_fatal() {
        let mock = ScriptedTokenData::new()
            .with_metadata_error(UpstreamError::RpcError {
                code: -32000,
                message: "currencies unavailable".to_string(),
            })
            .with_price(0.9)
            .with_pages(18, vec![holders(3)]);
        let queries = TokenQueries::new(mock.clone(), LabelTable::known());

        let overview = queries.basic_info(CONTRACT, Chain::Bsc).await.unwrap();

        assert!(overview.metadata.is_none());
        assert_eq!(overview.price_usd, Some(0.9));
        assert_eq!(overview.top_holders.len(), 3);
        assert_eq!(overview.top_holders[0].balance(), "3");
        assert_eq!(mock.page_requests(), vec![(None, 5)]);
    }

    #[tokio::test]
    async fn test_holder_errors_propagate() {
        let mock = ScriptedTokenData::new()
            .with_pages(18, vec![holders(1)])
            .fail_at(1, UpstreamError::StatusError { status: 403, body: String::new() });
        let queries = TokenQueries::new(mock, LabelTable::known());

        let err = queries.top_holders(CONTRACT, Chain::Bsc, 10).await.unwrap_err();
        assert!(matches!(err, MonitorError::Upstream(UpstreamError::StatusError { status: 403, .. })));
    }

    #[tokio::test]
    async fn test_invalid_contract() {
        let queries = TokenQueries::new(ScriptedTokenData::new(), LabelTable::known());
        let err = queries.basic_info("0xnope", Chain::Bsc).await.unwrap_err();
        assert!(matches!(err, MonitorError::Validation(ValidationError::MalformedAddress(_))));
    }

    #[tokio::test]
    async fn test_holders_count() {
        let queries = TokenQueries::new(ScriptedTokenData::new().with_holders_count(12_500), LabelTable::known());
        assert_eq!(queries.holders_count(CONTRACT, Chain::Bsc).await.unwrap(), 12_500);
    }
}
