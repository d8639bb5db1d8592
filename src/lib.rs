//! Onchain Monitor - Token Holder Snapshots for EVM Chains
//!
//! Fetches token metadata, prices and paginated holder lists from the Ankr
//! multichain API, labels known wallets, and writes holder snapshots to JSON.
//!
//! # Modules
//!
//! - `domain`: Core types (Chain, HolderRecord, LabelTable, SnapshotDocument)
//! - `ports`: Trait abstractions (TokenDataPort) and scripted test doubles
//! - `adapters`: External implementations (Ankr client, snapshot store, CLI)
//! - `config`: Configuration loading and validation
//! - `application`: Snapshot collection and read-only queries

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod config;
pub mod application;
