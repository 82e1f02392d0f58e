//! Cipher Vault CLI entry point.

use clap::Parser;
use cipher_vault_cli::{context, logging, run, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = tracing::subscriber::with_default(logging::bootstrap(cli.verbose), || {
        context::load_config(cli.config.as_deref())
    })?;
    logging::init(cli.verbose, &config.logging);

    run(cli, config).await
}
