//! Credential entry commands.

use clap::{Args, ValueEnum};
use cipher_vault_core::{EntryDraft, EntryId};
use cipher_vault_sync::analytics::{classify_strength, detect_duplicates};
use cipher_vault_sync::history::{is_in_history, reveal_history};
use cipher_vault_sync::{SortKey, SortOrder, ViewFolder, ViewQuery};

use crate::context::{secret_or_prompt, Context};
use crate::render;

#[derive(Args)]
pub struct EntryArgs {
    #[command(subcommand)]
    pub command: EntryCommand,
}

#[derive(clap::Subcommand)]
pub enum EntryCommand {
    /// Add an entry (prompts for the password)
    Add {
        /// Service name, e.g. "GitHub"
        service: String,

        #[command(flatten)]
        fields: EntryFields,
    },

    /// Edit an entry; omitted fields keep their value
    Edit {
        /// Entry id
        id: String,

        /// New service name
        #[arg(long)]
        service: Option<String>,

        #[command(flatten)]
        fields: EntryFields,

        /// Prompt for a new password
        #[arg(long, conflicts_with = "password")]
        change_password: bool,

        /// Remove all tags before adding the given ones
        #[arg(long)]
        clear_tags: bool,
    },

    /// List entries
    List {
        #[command(flatten)]
        filter: ListFilter,
    },

    /// Show one entry
    Show {
        /// Entry id
        id: String,

        /// Print the decrypted password
        #[arg(long)]
        reveal: bool,

        /// Print previous passwords
        #[arg(long)]
        history: bool,
    },

    /// Move an entry to the trash
    Trash {
        /// Entry id
        id: String,
    },

    /// Bring an entry back from the trash
    Restore {
        /// Entry id
        id: String,
    },

    /// Delete an entry permanently
    Purge {
        /// Entry id
        id: String,
    },

    /// Toggle the favorite flag
    Favorite {
        /// Entry id
        id: String,
    },
}

/// Optional entry fields shared by `add` and `edit`.
#[derive(Args, Debug, Default)]
pub struct EntryFields {
    /// Login name
    #[arg(short, long)]
    pub username: Option<String>,

    /// Password (prompted for when omitted on add)
    #[arg(long)]
    pub password: Option<String>,

    /// Service URL
    #[arg(long)]
    pub url: Option<String>,

    /// Free-form notes
    #[arg(long)]
    pub notes: Option<String>,

    /// Tag, repeatable
    #[arg(short, long = "tag")]
    pub tags: Vec<String>,

    /// Vault id or name (add only)
    #[arg(long)]
    pub vault: Option<String>,

    /// Mark as favorite
    #[arg(long)]
    pub favorite: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SortArg {
    Name,
    Created,
    #[default]
    Updated,
}

impl From<SortArg> for SortKey {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Name => SortKey::ServiceName,
            SortArg::Created => SortKey::CreatedAt,
            SortArg::Updated => SortKey::UpdatedAt,
        }
    }
}

/// List filters, also used to export the current view.
#[derive(Args, Debug, Default)]
pub struct ListFilter {
    /// Only entries of this vault (id or name)
    #[arg(long, conflicts_with = "trash")]
    pub vault: Option<String>,

    /// Only entries with this tag
    #[arg(long)]
    pub tag: Option<String>,

    /// Only favorites
    #[arg(long)]
    pub favorites: bool,

    /// Show the trash instead of active entries
    #[arg(long)]
    pub trash: bool,

    /// Case-insensitive text search
    #[arg(short, long)]
    pub search: Option<String>,

    /// Sort key
    #[arg(long, value_enum, default_value_t = SortArg::Updated)]
    pub sort: SortArg,

    /// Sort ascending instead of descending
    #[arg(long)]
    pub asc: bool,
}

impl ListFilter {
    /// True when any option narrows the list.
    pub fn is_filtered(&self) -> bool {
        self.vault.is_some()
            || self.tag.is_some()
            || self.favorites
            || self.trash
            || self.search.is_some()
    }

    pub fn to_query(&self, ctx: &Context) -> anyhow::Result<ViewQuery> {
        let folder = match (&self.vault, self.trash) {
            (Some(vault), _) => ViewFolder::Vault(ctx.resolve_vault(vault)?),
            (None, true) => ViewFolder::Trash,
            (None, false) => ViewFolder::All,
        };
        let order = if self.asc { SortOrder::Asc } else { SortOrder::Desc };

        let mut query = ViewQuery::new()
            .folder(folder)
            .favorites_only(self.favorites)
            .sort(self.sort.into(), order);
        if let Some(tag) = &self.tag {
            query = query.tag(tag.trim());
        }
        if let Some(search) = &self.search {
            query = query.search(search.as_str());
        }
        Ok(query)
    }
}

pub async fn run(args: EntryArgs, ctx: &Context) -> anyhow::Result<()> {
    match args.command {
        EntryCommand::Add { service, fields } => {
            let vault = fields
                .vault
                .as_deref()
                .map(|v| ctx.resolve_vault(v))
                .transpose()?;
            let password = secret_or_prompt(fields.password, "Password: ")?;
            warn_about_password(ctx, &password, None);

            let mut draft = EntryDraft::new(
                service,
                fields.username.unwrap_or_default(),
                password.as_str(),
            )
            .favorite(fields.favorite);
            draft.vault_id = vault;
            draft.url = fields.url;
            draft.notes = fields.notes;
            draft.tags = fields.tags;

            let id = ctx.coordinator.create_or_update(draft, None).await?;
            println!("Entry created ({id}).");
        }

        EntryCommand::Edit {
            id,
            service,
            fields,
            change_password,
            clear_tags,
        } => {
            let id = EntryId::new(id);
            let draft = edit_draft(ctx, &id, service, fields, change_password, clear_tags)?;
            ctx.coordinator.create_or_update(draft, Some(&id)).await?;
            println!("Entry {id} updated.");
        }

        EntryCommand::List { filter } => {
            let query = filter.to_query(ctx)?;
            let snapshot = ctx.snapshot();
            render::print_entries(&query.apply(&snapshot.entries), &snapshot.vaults);
        }

        EntryCommand::Show {
            id,
            reveal,
            history,
        } => {
            let id = EntryId::new(id);
            let snapshot = ctx.snapshot();
            let entry = snapshot.require_entry(&id)?;

            let secret = if reveal {
                Some(ctx.coordinator.reveal(&id)?)
            } else {
                None
            };
            render::print_entry(entry, &snapshot.vaults, secret.as_ref().map(|s| s.expose()));

            if history {
                let previous = reveal_history(&entry.secret_history, ctx.cipher());
                if previous.is_empty() {
                    println!("\nNo previous passwords.");
                } else {
                    println!("\nPrevious passwords:");
                    for (at, secret) in previous {
                        let shown = if reveal { secret.expose() } else { "********" };
                        println!("  {}  {}", at.format("%Y-%m-%d %H:%M"), shown);
                    }
                }
            }
        }

        EntryCommand::Trash { id } => {
            ctx.coordinator.trash(&EntryId::new(&id), false).await?;
            println!("Entry {id} moved to the trash.");
        }

        EntryCommand::Restore { id } => {
            ctx.coordinator.restore(&EntryId::new(&id)).await?;
            println!("Entry {id} restored.");
        }

        EntryCommand::Purge { id } => {
            ctx.coordinator.trash(&EntryId::new(&id), true).await?;
            println!("Entry {id} deleted permanently.");
        }

        EntryCommand::Favorite { id } => {
            let id = EntryId::new(id);
            ctx.coordinator.toggle_favorite(&id).await?;
            let favorite = ctx
                .snapshot()
                .entry(&id)
                .is_some_and(|e| e.is_favorite);
            println!(
                "Entry {id} {} favorites.",
                if favorite { "added to" } else { "removed from" }
            );
        }
    }

    Ok(())
}

/// Merge the given fields over the current values of entry `id`.
fn edit_draft(
    ctx: &Context,
    id: &EntryId,
    service: Option<String>,
    fields: EntryFields,
    change_password: bool,
    clear_tags: bool,
) -> anyhow::Result<EntryDraft> {
    if fields.vault.is_some() {
        anyhow::bail!("Entries cannot be moved between vaults");
    }

    let snapshot = ctx.snapshot();
    let current = snapshot.require_entry(id)?;

    let password = match (fields.password, change_password) {
        (Some(p), _) => Some(p),
        (None, true) => Some(secret_or_prompt(None, "New password: ")?),
        (None, false) => None,
    };
    let secret = match password {
        Some(p) => {
            warn_about_password(ctx, &p, Some(id));
            if is_in_history(&current.secret_history, &p, ctx.cipher()) {
                println!("Note: this password was used for this entry before.");
            }
            p
        }
        None => ctx.coordinator.reveal(id)?.expose().to_string(),
    };

    let mut tags: Vec<String> = if clear_tags {
        Vec::new()
    } else {
        current.tags.iter().cloned().collect()
    };
    tags.extend(fields.tags);

    let mut draft = EntryDraft::new(
        service.unwrap_or_else(|| current.service_name.clone()),
        fields.username.unwrap_or_else(|| current.username.clone()),
        secret,
    )
    .favorite(fields.favorite || current.is_favorite);
    draft.url = fields.url.or_else(|| current.url.clone());
    draft.notes = fields.notes.or_else(|| current.notes.clone());
    draft.tags = tags;
    Ok(draft)
}

/// Report strength and reuse of a password about to be stored.
fn warn_about_password(ctx: &Context, password: &str, exclude: Option<&EntryId>) {
    let strength = classify_strength(password);
    println!("Password strength: {}", strength.label);

    let snapshot = ctx.snapshot();
    let duplicates = detect_duplicates(&snapshot.entries, ctx.cipher(), password, exclude);
    if duplicates.count > 0 {
        println!(
            "Warning: this password is already used by {} other entr{}.",
            duplicates.count,
            if duplicates.count == 1 { "y" } else { "ies" }
        );
    }
}
