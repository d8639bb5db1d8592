//! Known Wallet Labels
//!
//! Static address annotations (exchanges, burn addresses) attached to holders.
//! Adding a label is a data-only change: append an entry to `KNOWN_LABELS`.

use std::collections::HashMap;

use super::address::normalize_address;

/// Built-in address labels. Keys may use any case.
pub const KNOWN_LABELS: &[(&str, &str)] = &[
    ("0x000000000000000000000000000000000000dEaD", "Burn Address"),
    ("0x0000000000000000000000000000000000000000", "Null Address"),
    // Binance
    ("0xF977814e90dA44bFA03b6295A0616a897441aceC", "Binance Hot Wallet"),
    ("0x8894E0a0c962CB723c1976a4421c95949bE2D4E3", "Binance"),
    ("0xe2fc31F816A9b94326492132018C3aEcC4a93aE1", "Binance"),
    ("0x3c783c21a0383057D128bae431894a5C19F9Cf06", "Binance"),
    // OKX
    ("0x5a52E96BAcdaBb82fd05763E25335261B270Efcb", "OKX"),
    ("0x6cC5F688a315f3dC28A7781717a9A798a59fDA7b", "OKX"),
    // Other exchanges
    ("0x28C6c06298d514Db089934071355E5743bf21d60", "Binance 14"),
    ("0x21a31Ee1afC51d94C2eFcCAa2092aD1028285549", "Bybit"),
];

/// Read-only address -> label mapping, keyed by lowercase address
#[derive(Debug, Clone, Default)]
pub struct LabelTable {
    labels: HashMap<String, String>,
}

impl LabelTable {
    /// Table built from `KNOWN_LABELS`
    pub fn known() -> Self {
        Self::from_pairs(KNOWN_LABELS.iter().copied())
    }

    /// Build a table from arbitrary address/label pairs
    pub fn from_pairs<I, A, L>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (A, L)>,
        A: AsRef<str>,
        L: Into<String>,
    {
        let labels = pairs
            .into_iter()
            .map(|(address, label)| (normalize_address(address.as_ref()), label.into()))
            .collect();

        Self { labels }
    }

    /// Label for `address`, or the empty string when unknown
    pub fn lookup(&self, address: &str) -> &str {
        self.labels
            .get(&normalize_address(address))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
