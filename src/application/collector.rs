//! Snapshot Collector
//!
//! Walks the cursor-paged holder endpoint until upstream reports exhaustion,
//! labels every holder and assembles a `SnapshotDocument`. Pages are fetched
//! strictly one after another: each cursor is only known once the previous
//! page has arrived.

use std::collections::HashMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::MonitorError;
use crate::adapters::ankr::MAX_PAGE_SIZE;
use crate::domain::{validate_contract, Chain, HolderRecord, LabelTable, SnapshotDocument, TokenMetadata};
use crate::ports::{RawHolder, TokenDataPort, UpstreamError};

/// Progress of an interrupted collection. Passing it to
/// `SnapshotCollector::resume` continues from the page that failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Holders accumulated so far, in upstream order
    pub holders: Vec<HolderRecord>,
    /// Cursor of the next page to request; `None` is the first page
    pub next_page_token: Option<String>,
    /// Decimals used for the holders already collected
    pub decimals: Option<u8>,
    /// Pages successfully processed
    pub pages_fetched: usize,
}

impl Checkpoint {
    pub fn holder_count(&self) -> usize {
        self.holders.len()
    }
}

/// Ordered holder list, deduplicated by lowercase address.
///
/// A re-delivered address keeps its first position and takes the latest
/// balance.
#[derive(Debug, Default)]
struct HolderAccumulator {
    records: Vec<HolderRecord>,
    positions: HashMap<String, usize>,
    duplicates: usize,
}

impl HolderAccumulator {
    fn from_records(records: Vec<HolderRecord>) -> Self {
        let mut acc = Self::default();
        for record in records {
            acc.push(record);
        }
        acc
    }

    fn push(&mut self, record: HolderRecord) {
        let key = record.normalized_address();
        match self.positions.get(&key) {
            Some(&index) => {
                tracing::warn!(
                    "Holder {} delivered twice, keeping latest balance {}",
                    record.address(),
                    record.balance()
                );
                self.records[index] = record;
                self.duplicates += 1;
            }
            None => {
                self.positions.insert(key, self.records.len());
                self.records.push(record);
            }
        }
    }

    fn len(&self) -> usize {
        self.records.len()
    }

    fn into_records(self) -> Vec<HolderRecord> {
        self.records
    }
}

/// Builds complete, labeled holder snapshots
#[derive(Debug, Clone)]
pub struct SnapshotCollector<P: TokenDataPort> {
    port: P,
    labels: LabelTable,
    page_size: u32,
}

impl<P: TokenDataPort> SnapshotCollector<P> {
    /// Collector using the largest page size upstream allows
    pub fn new(port: P, labels: LabelTable) -> Self {
        Self::with_page_size(port, labels, MAX_PAGE_SIZE)
    }

    pub fn with_page_size(port: P, labels: LabelTable, page_size: u32) -> Self {
        Self {
            port,
            labels,
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Collect every holder of `contract` on `chain`
    pub async fn collect(&self, contract: &str, chain: Chain) -> Result<SnapshotDocument, MonitorError> {
        self.collect_with_progress(contract, chain, |_| {}).await
    }

    /// Like `collect`, calling `progress` with the running holder count after each page
    pub async fn collect_with_progress<F>(
        &self,
        contract: &str,
        chain: Chain,
        progress: F,
    ) -> Result<SnapshotDocument, MonitorError>
    where
        F: FnMut(usize) + Send,
    {
        self.run(contract, chain, Checkpoint::default(), progress).await
    }

    /// Continue an interrupted collection from `checkpoint`
    pub async fn resume<F>(
        &self,
        contract: &str,
        chain: Chain,
        checkpoint: Checkpoint,
        progress: F,
    ) -> Result<SnapshotDocument, MonitorError>
    where
        F: FnMut(usize) + Send,
    {
        tracing::info!(
            "Resuming {} on {} after {} pages ({} holders)",
            contract,
            chain,
            checkpoint.pages_fetched,
            checkpoint.holder_count()
        );
        self.run(contract, chain, checkpoint, progress).await
    }

    async fn run<F>(
        &self,
        contract: &str,
        chain: Chain,
        checkpoint: Checkpoint,
        mut progress: F,
    ) -> Result<SnapshotDocument, MonitorError>
    where
        F: FnMut(usize) + Send,
    {
        let contract = validate_contract(contract)?;

        let metadata = fetch_metadata(&self.port, contract, chain).await;
        let price_usd = fetch_price(&self.port, contract, chain).await;

        let mut decimals = metadata.as_ref().map(|m| m.decimals).or(checkpoint.decimals);
        let mut cursor = checkpoint.next_page_token;
        let mut pages_fetched = checkpoint.pages_fetched;
        let mut holders = HolderAccumulator::from_records(checkpoint.holders);

        tracing::info!("Collecting holders of {} on {}", contract, chain);

        loop {
            let page = match self
                .port
                .get_token_holders(contract, chain, self.page_size, cursor.clone())
                .await
            {
                Ok(page) => page,
                Err(source) => {
                    return Err(interrupted(holders, cursor, decimals, pages_fetched, source));
                }
            };

            let is_last = page.is_last();
            let next_page_token = page.next_page_token.clone();

            // An empty page needs no decimals; an unlisted token with no
            // holders yields an empty snapshot.
            if !page.holders.is_empty() {
                let page_decimals = match decimals.or(page.token_decimals) {
                    Some(d) => d,
                    None => {
                        let source = UpstreamError::MissingDecimals(contract.to_string());
                        return Err(interrupted(holders, cursor, decimals, pages_fetched, source));
                    }
                };
                if let Some(reported) = page.token_decimals.filter(|d| *d != page_decimals) {
                    tracing::warn!(
                        "Page reports {} decimals for {}, using {}",
                        reported,
                        contract,
                        page_decimals
                    );
                }
                decimals = Some(page_decimals);

                match build_records(page.holders, page_decimals, &self.labels) {
                    Ok(records) => records.into_iter().for_each(|r| holders.push(r)),
                    Err(source) => {
                        return Err(interrupted(holders, cursor, decimals, pages_fetched, source));
                    }
                }
            } else if decimals.is_none() {
                decimals = page.token_decimals;
            }

            pages_fetched += 1;
            progress(holders.len());
            tracing::debug!("Page {} done, {} holders so far", pages_fetched, holders.len());

            if is_last {
                break;
            }
            cursor = next_page_token;
        }

        if holders.duplicates > 0 {
            tracing::warn!("{} duplicate holder entries merged", holders.duplicates);
        }

        let snapshot = SnapshotDocument::new(
            Utc::now(),
            contract,
            chain,
            metadata.as_ref(),
            decimals.unwrap_or_default(),
            price_usd,
            holders.into_records(),
        );

        tracing::info!(
            "Collected {} holders of {} on {} in {} pages",
            snapshot.holder_count(),
            contract,
            chain,
            pages_fetched
        );

        Ok(snapshot)
    }
}

/// Metadata is informational: failures are logged and the token is treated
/// as unlisted
pub(crate) async fn fetch_metadata<P: TokenDataPort + ?Sized>(
    port: &P,
    contract: &str,
    chain: Chain,
) -> Option<TokenMetadata> {
    match port.get_token_metadata(contract, chain).await {
        Ok(metadata) => metadata,
        Err(e) => {
            tracing::warn!("Could not fetch token metadata: {}", e);
            None
        }
    }
}

/// Price is informational: failures are logged and reported as "no price"
pub(crate) async fn fetch_price<P: TokenDataPort + ?Sized>(
    port: &P,
    contract: &str,
    chain: Chain,
) -> Option<f64> {
    match port.get_token_price(contract, chain).await {
        Ok(price) => price,
        Err(e) => {
            tracing::warn!("Could not fetch token price: {}", e);
            None
        }
    }
}

/// Decimal-shift and label one page of raw holders
pub(crate) fn build_records(
    raw: Vec<RawHolder>,
    decimals: u8,
    labels: &LabelTable,
) -> Result<Vec<HolderRecord>, UpstreamError> {
    raw.into_iter()
        .map(|holder| {
            let label = labels.lookup(&holder.address).to_string();
            HolderRecord::new(holder.address, holder.balance_raw, decimals, label)
                .map_err(|e| UpstreamError::ParseError(e.to_string()))
        })
        .collect()
}

/// Nothing collected yet is a plain upstream failure; otherwise the
/// accumulated holders travel with the error.
fn interrupted(
    holders: HolderAccumulator,
    cursor: Option<String>,
    decimals: Option<u8>,
    pages_fetched: usize,
    source: UpstreamError,
) -> MonitorError {
    if pages_fetched == 0 {
        tracing::error!("Holder request failed before any page: {}", source);
        return MonitorError::Upstream(source);
    }

    tracing::error!(
        "Pagination interrupted after {} pages ({} holders): {}",
        pages_fetched,
        holders.len(),
        source
    );

    MonitorError::PartialData {
        checkpoint: Checkpoint {
            holders: holders.into_records(),
            next_page_token: cursor,
            decimals,
            pages_fetched,
        },
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ValidationError;
    use crate::ports::mocks::ScriptedTokenData;
    use crate::ports::{HolderPage, MockTokenDataPort};
    use mockall::Sequence;

    const CONTRACT: &str = "0x0E09FaBB73Bd3Ade0a17ECC321fD13a19e81cE82";

    fn metadata(decimals: u8) -> TokenMetadata {
        TokenMetadata {
            contract: CONTRACT.to_string(),
            blockchain: Chain::Bsc,
            name: "PancakeSwap Token".to_string(),
            symbol: "CAKE".to_string(),
            decimals,
        }
    }

    fn page(holders: Vec<RawHolder>, next: Option<&str>) -> HolderPage {
        HolderPage {
            holders,
            token_decimals: Some(18),
            next_page_token: next.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_follows_cursors_in_order() {
        let mut mock = MockTokenDataPort::new();
        let mut seq = Sequence::new();

        mock.expect_get_token_metadata()
            .times(1)
            .returning(|_, _| Ok(Some(metadata(18))));
        mock.expect_get_token_price()
            .times(1)
            .returning(|_, _| Ok(Some(2.1)));
        mock.expect_get_token_holders()
            .withf(|contract, chain, size, token| {
                contract.eq_ignore_ascii_case(CONTRACT) && *chain == Chain::Bsc && *size == 500 && token.is_none()
            })
            .times(1)
            .in_sequence(&mut seq)
            .return_once(|_, _, _, _| {
                Ok(page(
                    vec![RawHolder::new("0x1111111111111111111111111111111111111111", "3000000000000000000")],
                    Some("cursor-2"),
                ))
            });
        mock.expect_get_token_holders()
            .withf(|_, _, _, token| token.as_deref() == Some("cursor-2"))
            .times(1)
            .in_sequence(&mut seq)
            .return_once(|_, _, _, _| {
                Ok(page(
                    vec![RawHolder::new("0x2222222222222222222222222222222222222222", "500000000000000000")],
                    None,
                ))
            });

        let collector = SnapshotCollector::with_page_size(mock, LabelTable::known(), 500);
        let snapshot = collector.collect(CONTRACT, Chain::Bsc).await.unwrap();

        assert_eq!(snapshot.holder_count(), 2);
        assert_eq!(snapshot.holders()[0].balance(), "3");
        assert_eq!(snapshot.holders()[1].balance(), "0.5");
        assert_eq!(snapshot.token_symbol(), "CAKE");
        assert_eq!(snapshot.price_usd(), Some(2.1));
    }

    #[tokio::test]
    async fn test_malformed_contract_makes_no_calls() {
        let mock = MockTokenDataPort::new();
        let collector = SnapshotCollector::new(mock, LabelTable::known());

        let err = collector.collect("0x1234", Chain::Eth).await.unwrap_err();
        assert!(matches!(
            err,
            MonitorError::Validation(ValidationError::MalformedAddress(_))
        ));
    }

    #[tokio::test]
    async fn test_metadata_failure_is_not_fatal() {
        let mut mock = MockTokenDataPort::new();
        mock.expect_get_token_metadata().times(1).returning(|_, _| {
            Err(UpstreamError::StatusError {
                status: 401,
                body: "unauthorized".to_string(),
            })
        });
        mock.expect_get_token_price().returning(|_, _| Ok(Some(0.3)));
        mock.expect_get_token_holders()
            .times(1)
            .return_once(|_, _, _, _| Ok(page(vec![RawHolder::new("0x3333333333333333333333333333333333333333", "4000000000000000000")], None)));

        let collector = SnapshotCollector::new(mock, LabelTable::known());
        let snapshot = collector.collect(CONTRACT, Chain::Bsc).await.unwrap();

        assert_eq!(snapshot.token_name(), "Unknown");
        assert_eq!(snapshot.token_symbol(), "???");
        assert_eq!(snapshot.decimals(), 18);
        assert_eq!(snapshot.holders()[0].balance(), "4");
    }

    #[tokio::test]
    async fn test_metadata_rpc_error_still_walks_pages() {
        let mock = ScriptedTokenData::new()
            .with_metadata_error(UpstreamError::RpcError {
                code: -32000,
                message: "currencies unavailable".to_string(),
            })
            .with_pages(18, vec![vec![RawHolder::new("0x3333333333333333333333333333333333333333", "1")]]);
        let collector = SnapshotCollector::new(mock.clone(), LabelTable::known());

        let snapshot = collector.collect(CONTRACT, Chain::Bsc).await.unwrap();

        assert_eq!(snapshot.holder_count(), 1);
        assert_eq!(snapshot.token_name(), "Unknown");
        assert!(!mock.page_requests().is_empty());
    }

    #[tokio::test]
    async fn test_unlisted_token_without_holders_is_empty_snapshot() {
        let mock = ScriptedTokenData::new().with_page(
            None,
            HolderPage {
                holders: vec![],
                token_decimals: None,
                next_page_token: None,
            },
        );
        let collector = SnapshotCollector::new(mock, LabelTable::known());

        let snapshot = collector.collect(CONTRACT, Chain::Bsc).await.unwrap();

        assert_eq!(snapshot.holder_count(), 0);
        assert!(snapshot.holders().is_empty());
        assert_eq!(snapshot.decimals(), 0);
    }

    #[tokio::test]
    async fn test_first_page_failure_is_upstream_error() {
        let mut mock = MockTokenDataPort::new();
        mock.expect_get_token_metadata().returning(|_, _| Ok(None));
        mock.expect_get_token_price().returning(|_, _| Ok(None));
        mock.expect_get_token_holders().times(1).returning(|_, _, _, _| {
            Err(UpstreamError::RpcError {
                code: -32602,
                message: "blockchain not supported".to_string(),
            })
        });

        let collector = SnapshotCollector::new(mock, LabelTable::known());
        let err = collector.collect(CONTRACT, Chain::Base).await.unwrap_err();
        assert!(matches!(err, MonitorError::Upstream(UpstreamError::RpcError { .. })));
    }

    #[tokio::test]
    async fn test_price_failure_is_not_fatal() {
        let mut mock = MockTokenDataPort::new();
        mock.expect_get_token_metadata().returning(|_, _| Ok(Some(metadata(6))));
        mock.expect_get_token_price()
            .returning(|_, _| Err(UpstreamError::Timeout));
        mock.expect_get_token_holders()
            .return_once(|_, _, _, _| Ok(page(vec![RawHolder::new("0x3333333333333333333333333333333333333333", "2500000")], None)));

        let collector = SnapshotCollector::new(mock, LabelTable::known());
        let snapshot = collector.collect(CONTRACT, Chain::Bsc).await.unwrap();

        assert_eq!(snapshot.price_usd(), None);
        // metadata decimals win over the page's tokenDecimals
        assert_eq!(snapshot.decimals(), 6);
        assert_eq!(snapshot.holders()[0].balance(), "2.5");
    }

    #[tokio::test]
    async fn test_missing_decimals() {
        let mut mock = MockTokenDataPort::new();
        mock.expect_get_token_metadata().returning(|_, _| Ok(None));
        mock.expect_get_token_price().returning(|_, _| Ok(None));
        mock.expect_get_token_holders().return_once(|_, _, _, _| {
            Ok(HolderPage {
                holders: vec![RawHolder::new("0x3333333333333333333333333333333333333333", "1")],
                token_decimals: None,
                next_page_token: None,
            })
        });

        let collector = SnapshotCollector::new(mock, LabelTable::known());
        let err = collector.collect(CONTRACT, Chain::Bsc).await.unwrap_err();
        assert!(matches!(err, MonitorError::Upstream(UpstreamError::MissingDecimals(_))));
    }

    #[test]
    fn test_accumulator_dedupes_keeping_latest() {
        let mut acc = HolderAccumulator::default();
        acc.push(HolderRecord::new("0xAAAA000000000000000000000000000000000001", "100", 0, "").unwrap());
        acc.push(HolderRecord::new("0xbbbb000000000000000000000000000000000002", "200", 0, "").unwrap());
        acc.push(HolderRecord::new("0xaaaa000000000000000000000000000000000001", "150", 0, "").unwrap());

        assert_eq!(acc.len(), 2);
        assert_eq!(acc.duplicates, 1);
        let records = acc.into_records();
        assert_eq!(records[0].balance(), "150");
        assert_eq!(records[1].balance(), "200");
    }

    #[test]
    fn test_build_records_labels_and_shifts() {
        let raw = vec![
            RawHolder::new("0xf977814e90da44bfa03b6295a0616a897441acec", "1000000"),
            RawHolder::new("0x4444444444444444444444444444444444444444", "5"),
        ];

        let records = build_records(raw, 6, &LabelTable::known()).unwrap();
        assert_eq!(records[0].label(), "Binance Hot Wallet");
        assert_eq!(records[0].balance(), "1");
        assert_eq!(records[1].label(), "");
        assert_eq!(records[1].balance(), "0.000005");
    }

    #[test]
    fn test_build_records_rejects_bad_balance() {
        let raw = vec![RawHolder::new("0x4444444444444444444444444444444444444444", "12.5")];
        assert!(matches!(
            build_records(raw, 18, &LabelTable::known()),
            Err(UpstreamError::ParseError(_))
        ));
    }
}
