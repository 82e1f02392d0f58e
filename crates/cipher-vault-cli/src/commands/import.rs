//! Import from other password managers.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Args, ValueEnum};
use cipher_vault_sync::import::{self, ImportFormat};

use crate::context::Context;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ImportFormatArg {
    Csv,
    Json,
}

impl From<ImportFormatArg> for ImportFormat {
    fn from(arg: ImportFormatArg) -> Self {
        match arg {
            ImportFormatArg::Csv => ImportFormat::Csv,
            ImportFormatArg::Json => ImportFormat::Json,
        }
    }
}

#[derive(Args)]
pub struct ImportArgs {
    /// CSV or JSON file to import
    pub file: PathBuf,

    /// File format (guessed from the extension when omitted)
    #[arg(long, value_enum)]
    pub format: Option<ImportFormatArg>,

    /// Target vault id or name
    #[arg(long)]
    pub vault: Option<String>,
}

pub async fn run(args: ImportArgs, ctx: &Context) -> anyhow::Result<()> {
    let format = match args.format {
        Some(f) => f.into(),
        None => ImportFormat::from_path(&args.file)?,
    };
    let vault = args
        .vault
        .as_deref()
        .map(|v| ctx.resolve_vault(v))
        .transpose()?;

    let text = tokio::fs::read_to_string(&args.file)
        .await
        .with_context(|| format!("reading {}", args.file.display()))?;
    let drafts = import::parse(&text, format)?;

    let report = ctx.coordinator.import(drafts, vault.as_ref()).await?;
    println!("Imported {} entr{}.", report.created.len(), if report.created.len() == 1 { "y" } else { "ies" });
    if !report.failed.is_empty() {
        println!("{} item(s) could not be imported:", report.failed.len());
        for failure in &report.failed {
            println!("  {}: {}", failure.service_name, failure.reason);
        }
    }
    Ok(())
}
