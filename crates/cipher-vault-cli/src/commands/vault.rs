//! Vault commands.

use clap::Args;

use crate::context::Context;

#[derive(Args)]
pub struct VaultArgs {
    #[command(subcommand)]
    pub command: VaultCommand,
}

#[derive(clap::Subcommand)]
pub enum VaultCommand {
    /// List vaults with their entry counts
    List,

    /// Create a vault
    Add {
        /// Vault name
        name: String,
    },
}

pub async fn run(args: VaultArgs, ctx: &Context) -> anyhow::Result<()> {
    match args.command {
        VaultCommand::List => {
            let snapshot = ctx.snapshot();
            println!("{:<22} {:<24} {:>7} {:>7}", "ID", "NAME", "ACTIVE", "TRASH");
            println!("{}", "-".repeat(63));
            for vault in &snapshot.vaults {
                let (active, trashed) = snapshot
                    .entries
                    .iter()
                    .filter(|e| e.vault_id == vault.id)
                    .fold((0, 0), |(a, t), e| {
                        if e.is_active() {
                            (a + 1, t)
                        } else {
                            (a, t + 1)
                        }
                    });
                println!("{:<22} {:<24} {:>7} {:>7}", vault.id, vault.name, active, trashed);
            }
        }

        VaultCommand::Add { name } => {
            let vault = ctx.coordinator.add_vault(&name).await?;
            println!("Vault '{}' created ({}).", vault.name, vault.id);
        }
    }

    Ok(())
}
