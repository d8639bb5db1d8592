//! CLI Adapter
//!
//! Command-line interface for the onchain token monitor.
//! Uses clap derive macros for argument parsing.

mod commands;
mod display;

pub use commands::{CliApp, Command, DiffCmd, TokenArgs, TopHoldersCmd};

use anyhow::Result;

/// Initialize the CLI application
pub fn init() -> CliApp {
    use clap::Parser;
    CliApp::parse()
}

/// Execute the CLI command
pub async fn execute(app: CliApp) -> Result<()> {
    commands::execute(app).await
}
