//! CLI Command Handlers
//!
//! Implementation of all CLI commands for the onchain token monitor.

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;

use super::display::{format_balance, format_price, print_footer, print_header, print_holders_table};
use crate::adapters::ankr::AnkrClient;
use crate::adapters::snapshot_store::SnapshotStore;
use crate::application::{MonitorError, SnapshotCollector, TokenQueries, DEFAULT_TOP_HOLDERS};
use crate::config::{load_config_or_default, Config, DEFAULT_CONFIG_PATH};
use crate::config::loader::LoggingSection;
use crate::domain::{compare, display_name_or_contract, validate_contract, Chain, LabelTable};

/// Onchain Monitor - token holder snapshots over the Ankr multichain API
#[derive(Parser, Debug)]
#[command(
    name = "onchain-monitor",
    version = env!("CARGO_PKG_VERSION"),
    about = "Token holder monitor for EVM chains",
    long_about = "Fetches token metadata, prices and holder lists from the Ankr multichain \
                  API, labels known exchange and burn wallets, and writes full holder \
                  snapshots to JSON for later comparison."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "FILE", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Token name, symbol, price and the top 5 holders
    #[command(alias = "basic")]
    BasicInfo(TokenArgs),

    /// Table of the largest holders
    #[command(alias = "holders")]
    TopHolders(TopHoldersCmd),

    /// Page through every holder and save a snapshot file
    #[command(alias = "snapshot")]
    FullSnapshot(TokenArgs),

    /// Compare two snapshot files
    Diff(DiffCmd),
}

/// Token contract and chain
#[derive(Args, Debug, Clone)]
pub struct TokenArgs {
    /// Token contract address (0x + 40 hex digits)
    #[arg(value_name = "CONTRACT")]
    pub contract: String,

    /// Chain: bsc, eth, polygon, arbitrum, base, avalanche (default from config)
    #[arg(value_name = "CHAIN")]
    pub chain: Option<String>,
}

/// Largest holders
#[derive(Args, Debug, Clone)]
pub struct TopHoldersCmd {
    #[command(flatten)]
    pub token: TokenArgs,

    /// Number of holders to show
    #[arg(short, long, value_name = "N", default_value_t = DEFAULT_TOP_HOLDERS)]
    pub limit: u32,
}

/// Snapshot comparison
#[derive(Args, Debug, Clone)]
pub struct DiffCmd {
    /// Older snapshot file
    #[arg(value_name = "OLD")]
    pub old: PathBuf,

    /// Newer snapshot file (default: latest snapshot for the same chain)
    #[arg(value_name = "NEW")]
    pub new: Option<PathBuf>,

    /// Maximum rows printed per section
    #[arg(long, value_name = "N", default_value_t = 20)]
    pub show: usize,
}

/// Execute the parsed command
pub async fn execute(app: CliApp) -> Result<()> {
    let config = load_config_or_default(&app.config)
        .with_context(|| format!("Failed to load configuration from {}", app.config.display()))?;
    init_logging(app.verbose, app.debug, &config.logging)?;

    match app.command {
        Command::BasicInfo(args) => basic_info_command(args, &config).await,
        Command::TopHolders(cmd) => top_holders_command(cmd, &config).await,
        Command::FullSnapshot(args) => full_snapshot_command(args, &config).await,
        Command::Diff(cmd) => diff_command(cmd, &config),
    }
}

fn init_logging(verbose: bool, debug: bool, logging: &LoggingSection) -> Result<()> {
    use std::sync::Mutex;
    use tracing_subscriber::{fmt, EnvFilter};

    let level = if debug {
        "debug".to_string()
    } else if verbose {
        "info".to_string()
    } else {
        logging.get_level()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if logging.log_to_file {
        let path = PathBuf::from(shellexpand::tilde(&logging.log_file).to_string());
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;

        fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else {
        fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    Ok(())
}

/// Validated contract and chain, falling back to the configured default chain
fn resolve_target(args: &TokenArgs, config: &Config) -> Result<(String, Chain)> {
    let chain = match args.chain.as_deref() {
        Some(name) => name
            .parse::<Chain>()
            .map_err(|e| anyhow!("{}. Supported chains: {}", e, Chain::supported_list()))?,
        None => config.snapshot.default_chain(),
    };
    let contract = validate_contract(&args.contract)?.to_string();
    Ok((contract, chain))
}

fn build_client(config: &Config) -> Result<AnkrClient> {
    let client = AnkrClient::with_config(config.ankr.client_config())
        .context("Failed to create Ankr client")?;
    tracing::debug!("Using Ankr endpoint {}", client.rpc_url());
    Ok(client)
}

async fn basic_info_command(args: TokenArgs, config: &Config) -> Result<()> {
    let (contract, chain) = resolve_target(&args, config)?;
    let queries = TokenQueries::new(build_client(config)?, LabelTable::known());

    print_header("Basic Info", &contract, chain);
    let overview = queries
        .basic_info(&contract, chain)
        .await
        .context("Failed to fetch token info")?;

    println!();
    match &overview.metadata {
        Some(meta) => {
            println!("Name:     {}", meta.name);
            println!("Symbol:   {}", meta.symbol);
            println!("Decimals: {}", meta.decimals);
        }
        None => println!("Token metadata not found"),
    }
    println!("Price:    {}", format_price(overview.price_usd));

    println!();
    println!("Top {} holders:", overview.top_holders.len());
    print_holders_table(&overview.top_holders);
    println!();
    print_footer();
    Ok(())
}

async fn top_holders_command(cmd: TopHoldersCmd, config: &Config) -> Result<()> {
    let (contract, chain) = resolve_target(&cmd.token, config)?;
    let queries = TokenQueries::new(build_client(config)?, LabelTable::known());

    print_header("Top Holders", &contract, chain);
    let overview = queries
        .top_holders(&contract, chain, cmd.limit)
        .await
        .context("Failed to fetch top holders")?;

    println!();
    println!("Token: {}", display_name_or_contract(overview.metadata.as_ref(), &contract));
    println!("Price: {}", format_price(overview.price_usd));
    println!();
    print_holders_table(&overview.top_holders);
    println!();
    print_footer();
    Ok(())
}

async fn full_snapshot_command(args: TokenArgs, config: &Config) -> Result<()> {
    let (contract, chain) = resolve_target(&args, config)?;
    let client = build_client(config)?;
    let page_size = client.page_size();
    let queries = TokenQueries::new(client.clone(), LabelTable::known());
    let collector = SnapshotCollector::with_page_size(client, LabelTable::known(), page_size);
    let store = SnapshotStore::new(config.snapshot.get_dir());

    print_header("Full Snapshot", &contract, chain);

    // Indexed count is informational only
    match queries.holders_count(&contract, chain).await {
        Ok(count) => println!("Indexed holders: {}", count),
        Err(e) => tracing::warn!("Could not fetch holder count: {}", e),
    }

    println!("Fetching holders ({} per page)...", page_size);
    let result = collector
        .collect_with_progress(&contract, chain, |count| {
            print!("\r  Collected {} holders", count);
            let _ = std::io::stdout().flush();
        })
        .await;
    println!();

    let snapshot = match result {
        Ok(snapshot) => snapshot,
        Err(e) => {
            if let Some(checkpoint) = e.checkpoint() {
                eprintln!(
                    "Stopped after {} pages with {} holders; no snapshot written",
                    checkpoint.pages_fetched,
                    checkpoint.holder_count()
                );
            }
            if let MonitorError::Upstream(source) | MonitorError::PartialData { source, .. } = &e {
                if source.is_retryable() {
                    eprintln!("Upstream failure looks transient; running the snapshot again may succeed");
                }
            }
            return Err(e).context("Full snapshot failed");
        }
    };

    let path = store.save(&snapshot).context("Failed to save snapshot")?;

    println!();
    println!("Token:          {} ({})", snapshot.token_name(), snapshot.token_symbol());
    println!("Price:          {}", format_price(snapshot.price_usd()));
    println!("Total holders:  {}", snapshot.holder_count());
    println!("Known wallets:  {}", snapshot.labeled_holders().count());
    for holder in snapshot.labeled_holders() {
        println!("  {:<22} {}", holder.label(), format_balance(holder.balance()));
    }
    println!("Saved to:       {}", path.display());
    print_footer();
    Ok(())
}

fn diff_command(cmd: DiffCmd, config: &Config) -> Result<()> {
    let old = SnapshotStore::load(&cmd.old)
        .with_context(|| format!("Failed to load {}", cmd.old.display()))?;

    let new_path = match cmd.new {
        Some(path) => path,
        None => {
            let store = SnapshotStore::new(config.snapshot.get_dir());
            match store.latest(old.blockchain())? {
                Some(path) if path != cmd.old => path,
                _ => bail!(
                    "No newer {} snapshot in {} to compare against",
                    old.blockchain(),
                    store.dir().display()
                ),
            }
        }
    };
    let new = SnapshotStore::load(&new_path)
        .with_context(|| format!("Failed to load {}", new_path.display()))?;

    if !old.contract().eq_ignore_ascii_case(new.contract()) {
        tracing::warn!(
            "Comparing snapshots of different contracts: {} vs {}",
            old.contract(),
            new.contract()
        );
    }

    let diff = compare(&old, &new);

    println!("{}", super::display::rule());
    println!("Snapshot Diff - {} on {}", old.contract(), old.blockchain());
    println!("Old: {} ({}, {} holders)", cmd.old.display(), old.timestamp(), old.holder_count());
    println!("New: {} ({}, {} holders)", new_path.display(), new.timestamp(), new.holder_count());
    println!("{}", super::display::rule());

    if diff.is_empty() {
        println!("No changes");
        return Ok(());
    }

    println!("New holders:     {}", diff.new_holders.len());
    for holder in diff.new_holders.iter().take(cmd.show) {
        println!("  + {} {} {}", holder.address(), format_balance(holder.balance()), holder.label());
    }
    println!("Removed holders: {}", diff.removed_holders.len());
    for holder in diff.removed_holders.iter().take(cmd.show) {
        println!("  - {} {} {}", holder.address(), format_balance(holder.balance()), holder.label());
    }
    println!("Balance changes: {}", diff.balance_changes.len());
    for change in diff.balance_changes.iter().take(cmd.show) {
        println!(
            "  ~ {} {} -> {}",
            change.address,
            format_balance(&change.old_balance),
            format_balance(&change.new_balance)
        );
    }
    Ok(())
}
