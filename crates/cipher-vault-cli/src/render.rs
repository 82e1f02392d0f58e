//! Plain-text tables for terminal output.

use cipher_vault_core::{CredentialEntry, Vault};

/// Shorten `s` to at most `max` characters, marking the cut with `…`.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn vault_name<'a>(vaults: &'a [Vault], entry: &CredentialEntry) -> &'a str {
    vaults
        .iter()
        .find(|v| v.id == entry.vault_id)
        .map(|v| v.name.as_str())
        .unwrap_or("?")
}

/// Print entries as a table, one line each.
pub fn print_entries(entries: &[CredentialEntry], vaults: &[Vault]) {
    if entries.is_empty() {
        println!("No entries.");
        return;
    }

    println!(
        "{:<22} {:<24} {:<24} {:<14} {:<3} {}",
        "ID", "SERVICE", "USERNAME", "VAULT", "FAV", "UPDATED"
    );
    println!("{}", "-".repeat(110));
    for entry in entries {
        println!(
            "{:<22} {:<24} {:<24} {:<14} {:<3} {}",
            entry.id,
            truncate(&entry.service_name, 24),
            truncate(&entry.username, 24),
            truncate(vault_name(vaults, entry), 14),
            if entry.is_favorite { "*" } else { "" },
            entry.updated_at.format("%Y-%m-%d %H:%M")
        );
    }
    println!("\n{} entr{}.", entries.len(), if entries.len() == 1 { "y" } else { "ies" });
}

/// Print every field of one entry. The secret is only shown when given.
pub fn print_entry(entry: &CredentialEntry, vaults: &[Vault], secret: Option<&str>) {
    println!("ID:        {}", entry.id);
    println!("Service:   {}", entry.service_name);
    println!("Username:  {}", entry.username);
    println!("Password:  {}", secret.unwrap_or("********"));
    if let Some(url) = &entry.url {
        println!("URL:       {url}");
    }
    println!("Vault:     {}", vault_name(vaults, entry));
    if !entry.tags.is_empty() {
        let tags: Vec<&str> = entry.tags.iter().map(String::as_str).collect();
        println!("Tags:      {}", tags.join(", "));
    }
    if entry.is_favorite {
        println!("Favorite:  yes");
    }
    if let Some(notes) = &entry.notes {
        println!("Notes:     {notes}");
    }
    println!("Created:   {}", entry.created_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("Updated:   {}", entry.updated_at.format("%Y-%m-%d %H:%M:%S UTC"));
    if let Some(deleted) = entry.deleted_at {
        println!("Trashed:   {}", deleted.format("%Y-%m-%d %H:%M:%S UTC"));
    }
}
