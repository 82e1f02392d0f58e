//! API token commands.

use clap::Args;
use cipher_vault_core::SecretString;

use crate::context::{secret_or_prompt, Context};

#[derive(Args)]
pub struct TokenArgs {
    #[command(subcommand)]
    pub command: TokenCommand,
}

#[derive(clap::Subcommand)]
pub enum TokenCommand {
    /// Store a token, replacing the value of one with the same name
    Add {
        /// Token name
        name: String,

        /// Token value (if omitted, prompts for hidden input)
        #[arg(long)]
        value: Option<String>,
    },

    /// Rename a token or replace its value
    Edit {
        /// Token id or name
        token: String,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New value (if omitted, the current value is kept)
        #[arg(long)]
        value: Option<String>,
    },

    /// List tokens (names only)
    List,

    /// Print a decrypted token
    Show {
        /// Token id or name
        token: String,
    },

    /// Delete a token
    Delete {
        /// Token id or name
        token: String,
    },
}

pub async fn run(args: TokenArgs, ctx: &Context) -> anyhow::Result<()> {
    let service = &ctx.tokens;
    let user = &ctx.user;

    match args.command {
        TokenCommand::Add { name, value } => {
            let value = SecretString::new(secret_or_prompt(
                value,
                &format!("Value for '{name}': "),
            )?);
            let existing = service.find(user, name.trim()).await.ok();
            let token = service
                .add_or_update(user, &name, &value, existing.as_ref().map(|t| &t.id))
                .await?;
            let verb = if existing.is_some() { "updated" } else { "stored" };
            println!("Token '{}' {verb}.", token.name);
        }

        TokenCommand::Edit { token, name, value } => {
            let existing = service.find(user, &token).await?;
            let name = name.unwrap_or_else(|| existing.name.clone());
            let value = SecretString::new(value.unwrap_or_default());
            let token = service
                .add_or_update(user, &name, &value, Some(&existing.id))
                .await?;
            println!("Token '{}' updated.", token.name);
        }

        TokenCommand::List => {
            let tokens = service.list(user).await?;
            if tokens.is_empty() {
                println!("No tokens stored.");
            } else {
                println!("{:<22} {:<32} {}", "ID", "NAME", "UPDATED");
                println!("{}", "-".repeat(78));
                for t in &tokens {
                    println!(
                        "{:<22} {:<32} {}",
                        t.id,
                        t.name,
                        t.updated_at.format("%Y-%m-%d %H:%M:%S UTC")
                    );
                }
                println!("\n{} token(s) total.", tokens.len());
            }
        }

        TokenCommand::Show { token } => {
            let token = service.find(user, &token).await?;
            println!("{}", service.reveal(&token).expose());
        }

        TokenCommand::Delete { token } => {
            let found = service.find(user, &token).await?;
            service.delete(user, &found.id).await?;
            println!("Token '{}' deleted.", found.name);
        }
    }

    Ok(())
}
