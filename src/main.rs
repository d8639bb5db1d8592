//! Onchain Monitor - Token Holder Snapshots for EVM Chains

use anyhow::Result;

use onchain_monitor::adapters::cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env file if it exists (API keys go here, not in the TOML config)
    dotenvy::dotenv().ok();

    let app = cli::init();
    cli::execute(app).await
}
