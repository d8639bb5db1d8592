//! Snapshot Documents
//!
//! Point-in-time capture of every holder of a token, plus the comparison of
//! two captures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::chain::Chain;
use super::holder::HolderRecord;
use super::token::{TokenMetadata, UNKNOWN_TOKEN_NAME, UNKNOWN_TOKEN_SYMBOL};

/// A complete holder snapshot, written once per run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotDocument {
    timestamp: DateTime<Utc>,
    contract: String,
    blockchain: Chain,
    token_name: String,
    token_symbol: String,
    decimals: u8,
    price_usd: Option<f64>,
    holder_count: usize,
    holders: Vec<HolderRecord>,
}

impl SnapshotDocument {
    /// Assemble a document. `holder_count` is always taken from `holders`.
    pub fn new(
        timestamp: DateTime<Utc>,
        contract: impl Into<String>,
        blockchain: Chain,
        metadata: Option<&TokenMetadata>,
        decimals: u8,
        price_usd: Option<f64>,
        holders: Vec<HolderRecord>,
    ) -> Self {
        let (token_name, token_symbol) = match metadata {
            Some(meta) => (meta.name.clone(), meta.symbol.clone()),
            None => (UNKNOWN_TOKEN_NAME.to_string(), UNKNOWN_TOKEN_SYMBOL.to_string()),
        };

        Self {
            timestamp,
            contract: contract.into(),
            blockchain,
            token_name,
            token_symbol,
            decimals,
            price_usd,
            holder_count: holders.len(),
            holders,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn contract(&self) -> &str {
        &self.contract
    }

    pub fn blockchain(&self) -> Chain {
        self.blockchain
    }

    pub fn token_name(&self) -> &str {
        &self.token_name
    }

    pub fn token_symbol(&self) -> &str {
        &self.token_symbol
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn price_usd(&self) -> Option<f64> {
        self.price_usd
    }

    pub fn holder_count(&self) -> usize {
        self.holder_count
    }

    pub fn holders(&self) -> &[HolderRecord] {
        &self.holders
    }

    /// Holders carrying a known label
    pub fn labeled_holders(&self) -> impl Iterator<Item = &HolderRecord> {
        self.holders.iter().filter(|h| h.has_label())
    }

    /// True when the stored count agrees with the holder list. Documents
    /// loaded from disk are only trusted after this check.
    pub fn is_consistent(&self) -> bool {
        self.holder_count == self.holders.len()
    }
}

/// A holder whose balance differs between two snapshots
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceChange {
    pub address: String,
    pub old_balance: String,
    pub new_balance: String,
}

/// Differences between an older and a newer snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotDiff {
    pub new_holders: Vec<HolderRecord>,
    pub removed_holders: Vec<HolderRecord>,
    pub balance_changes: Vec<BalanceChange>,
}

impl SnapshotDiff {
    pub fn is_empty(&self) -> bool {
        self.new_holders.is_empty()
            && self.removed_holders.is_empty()
            && self.balance_changes.is_empty()
    }
}

/// Compare two snapshots by (case-insensitive) holder address.
///
/// New and removed holders keep the order of their own snapshot; balance
/// changes are sorted by address.
pub fn compare(old: &SnapshotDocument, new: &SnapshotDocument) -> SnapshotDiff {
    let old_by_address: HashMap<String, &HolderRecord> = old
        .holders
        .iter()
        .map(|h| (h.normalized_address(), h))
        .collect();
    let new_addresses: HashSet<String> =
        new.holders.iter().map(HolderRecord::normalized_address).collect();

    let new_holders = new
        .holders
        .iter()
        .filter(|h| !old_by_address.contains_key(&h.normalized_address()))
        .cloned()
        .collect();

    let removed_holders = old
        .holders
        .iter()
        .filter(|h| !new_addresses.contains(&h.normalized_address()))
        .cloned()
        .collect();

    let mut balance_changes: Vec<BalanceChange> = new
        .holders
        .iter()
        .filter_map(|h| {
            let previous = old_by_address.get(&h.normalized_address())?;
            (previous.balance_raw() != h.balance_raw()).then(|| BalanceChange {
                address: h.address().to_string(),
                old_balance: previous.balance().to_string(),
                new_balance: h.balance().to_string(),
            })
        })
        .collect();
    balance_changes.sort_by(|a, b| a.address.to_lowercase().cmp(&b.address.to_lowercase()));

    SnapshotDiff {
        new_holders,
        removed_holders,
        balance_changes,
    }
}
