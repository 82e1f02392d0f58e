//! Encrypted export.

use std::collections::BTreeSet;
use std::path::PathBuf;

use chrono::Local;
use clap::Args;
use cipher_vault_core::{EntryId, SecretString};
use cipher_vault_sync::export::export_scope;
use cipher_vault_sync::{ExportFormat, ExportOptions, ExportScope};

use super::entry::ListFilter;
use crate::context::{secret_or_prompt, Context};

#[derive(Args)]
pub struct ExportArgs {
    /// Payload format: json or csv
    #[arg(short, long, default_value = "json")]
    pub format: ExportFormat,

    /// Export only these entries (repeatable)
    #[arg(long = "id", conflicts_with_all = ["vault", "tag", "favorites", "trash", "search"])]
    pub ids: Vec<String>,

    /// Export the filtered list
    #[command(flatten)]
    pub filter: ListFilter,

    /// Encryption passphrase (prompted for when omitted)
    #[arg(long, env = "CIPHER_VAULT_EXPORT_PASSPHRASE", hide_env_values = true)]
    pub passphrase: Option<String>,

    /// Output directory (defaults to `export.output_dir`)
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

impl ExportArgs {
    /// Which entries to export: explicit ids, else the filtered view when a
    /// filter is given, else everything active.
    pub fn scope(&self, ctx: &Context) -> anyhow::Result<ExportScope> {
        if !self.ids.is_empty() {
            let ids: BTreeSet<EntryId> = self.ids.iter().map(|id| EntryId::new(id.trim())).collect();
            return Ok(ExportScope::SelectedIds(ids));
        }
        if self.filter.is_filtered() {
            let query = self.filter.to_query(ctx)?;
            return Ok(ExportScope::CurrentView(query.apply(&ctx.snapshot().entries)));
        }
        Ok(ExportScope::All)
    }
}

fn read_passphrase(given: Option<String>) -> anyhow::Result<SecretString> {
    if let Some(p) = given {
        return Ok(SecretString::new(p));
    }
    let first = SecretString::new(secret_or_prompt(None, "Export passphrase: ")?);
    let second = SecretString::new(secret_or_prompt(None, "Repeat passphrase: ")?);
    if first != second {
        anyhow::bail!("Passphrases do not match");
    }
    Ok(first)
}

pub async fn run(args: ExportArgs, ctx: &Context) -> anyhow::Result<()> {
    let scope = args.scope(ctx)?;
    let passphrase = read_passphrase(args.passphrase.clone())?;
    let options = ExportOptions::from(&ctx.config.export);
    let snapshot = ctx.snapshot();

    let export = export_scope(
        &snapshot.entries,
        &snapshot.vaults,
        ctx.cipher(),
        &scope,
        args.format,
        &passphrase,
        &options,
        Local::now().date_naive(),
    )?;

    let dir = match args.out {
        Some(dir) => dir,
        None => ctx.config.export_dir()?,
    };
    let path = export.write_to(&dir).await?;
    println!(
        "Exported {} entr{} to {}",
        export.record_count,
        if export.record_count == 1 { "y" } else { "ies" },
        path.display()
    );
    Ok(())
}
