//! Domain Layer - Core types for token holder analytics
//!
//! Pure types and logic with no I/O. All upstream interaction happens
//! through the ports layer.
//!
//! - `chain`: supported blockchain identifiers
//! - `address`: address validation and normalization
//! - `holder`: holder records and exact decimal shifting
//! - `labels`: known wallet labels
//! - `token`: token metadata
//! - `snapshot`: snapshot documents and snapshot comparison

pub mod address;
pub mod chain;
pub mod holder;
pub mod labels;
pub mod snapshot;
pub mod token;

use thiserror::Error;

pub use address::{is_valid_address, normalize_address, validate_contract};
pub use chain::Chain;
pub use holder::{shift_decimals, HolderRecord};
pub use labels::{LabelTable, KNOWN_LABELS};
pub use snapshot::{compare, BalanceChange, SnapshotDiff, SnapshotDocument};
pub use token::{display_name_or_contract, TokenMetadata};

/// Input rejected before any upstream call
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Malformed address '{0}': expected 0x followed by 40 hex characters")]
    MalformedAddress(String),

    #[error("Unsupported chain '{0}'")]
    UnsupportedChain(String),

    #[error("Invalid raw balance '{0}': expected an unsigned integer")]
    InvalidBalance(String),
}
