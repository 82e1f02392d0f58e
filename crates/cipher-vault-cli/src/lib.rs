//! Cipher Vault command-line interface.

pub mod commands;
pub mod context;
pub mod logging;
pub mod render;

use clap::{Parser, Subcommand};
use cipher_vault_core::Config;

use crate::context::Context;

/// Cipher Vault - encrypted credential vaults
#[derive(Parser)]
#[command(name = "cipher-vault")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to config file
    #[arg(short, long, env = "CIPHER_VAULT_CONFIG")]
    pub config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Manage vaults
    Vault(commands::vault::VaultArgs),

    /// Manage credential entries
    Entry(commands::entry::EntryArgs),

    /// List tags in use
    Tags,

    /// Show the security report
    Report(commands::report::ReportArgs),

    /// Write a passphrase-encrypted export
    Export(commands::export::ExportArgs),

    /// Import entries from a CSV or JSON file
    Import(commands::import::ImportArgs),

    /// Generate a random password
    Generate(commands::generate::GenerateArgs),

    /// Manage API tokens
    Token(commands::token::TokenArgs),

    /// Configuration management
    Config(commands::config::ConfigArgs),

    /// Show version information
    Version,
}

/// Run the CLI with the given arguments and loaded configuration.
pub async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    match cli.command {
        Commands::Config(args) => return commands::config::run(args, &config, cli.config.as_deref()),
        Commands::Generate(args) => return commands::generate::run(args),
        Commands::Version => {
            println!("cipher-vault {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        _ => {}
    }

    let ctx = Context::open(config).await?;
    match cli.command {
        Commands::Vault(args) => commands::vault::run(args, &ctx).await,
        Commands::Entry(args) => commands::entry::run(args, &ctx).await,
        Commands::Tags => commands::report::run_tags(&ctx),
        Commands::Report(args) => commands::report::run(args, &ctx),
        Commands::Export(args) => commands::export::run(args, &ctx).await,
        Commands::Import(args) => commands::import::run(args, &ctx).await,
        Commands::Token(args) => commands::token::run(args, &ctx).await,
        Commands::Config(_) | Commands::Generate(_) | Commands::Version => Ok(()),
    }
}
