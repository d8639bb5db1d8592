//! Ankr Token API Adapter
//!
//! Implements `TokenDataPort` on top of Ankr's multichain JSON-RPC API:
//! - `ankr_getCurrencies` for name, symbol and decimals
//! - `ankr_getTokenPrice` for the USD price
//! - `ankr_getTokenHolders` for the cursor-paged holder list
//! - `ankr_getTokenHoldersCount` for the indexed holder count
//!
//! # Example
//!
//! ```rust,ignore
//! use onchain_monitor::adapters::ankr::AnkrClient;
//! use onchain_monitor::domain::Chain;
//! use onchain_monitor::ports::TokenDataPort;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = AnkrClient::new()?;
//!     let page = client
//!         .get_token_holders("0x0E09FaBB73Bd3Ade0a17ECC321fD13a19e81cE82", Chain::Bsc, 20, None)
//!         .await?;
//!     println!("{} holders on the first page", page.holders.len());
//!     Ok(())
//! }
//! ```

mod client;
mod types;

pub use client::{AnkrClient, AnkrConfig, DEFAULT_RPC_URL, MAX_PAGE_SIZE};
pub use types::Currency;
