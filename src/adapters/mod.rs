//! Adapters Layer - External System Implementations
//!
//! This module contains implementations of the port traits and outer surfaces:
//! - Ankr: multichain token API client
//! - Snapshot store: JSON snapshot files on disk
//! - CLI: Command-line interface handlers

pub mod ankr;
pub mod cli;
pub mod snapshot_store;

pub use ankr::AnkrClient;
pub use cli::CliApp;
pub use snapshot_store::{PersistError, SnapshotStore};
