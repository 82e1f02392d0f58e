//! Cache mutations as commands.
//!
//! Every mutation is split into a synchronous [`Command::apply`] against a
//! copy of the cache and an asynchronous [`Command::commit`] against the
//! repository. The coordinator owns snapshot, publish and rollback, so all
//! mutations share one implementation of the optimistic protocol.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cipher_vault_core::{CredentialEntry, EntryId, EntryPatch, UserId, Vault, VaultId};

use crate::cache::{CacheState, Footprint};
use crate::error::SyncError;
use crate::repository::VaultRepository;
use crate::Result;

/// An optimistic mutation.
#[async_trait]
pub trait Command: Send + Sync {
    /// What a successful commit yields.
    type Output: Send;

    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// What `apply` changes, reverted when the commit fails.
    fn footprint(&self) -> Footprint;

    /// Apply the mutation to `state`. An error rejects the command before
    /// anything is published.
    fn apply(&mut self, state: &mut CacheState) -> Result<()>;

    /// Persist the mutation. Only called after a successful `apply`.
    async fn commit(&self, repo: &dyn VaultRepository, user: &UserId) -> Result<Self::Output>;
}

fn applied_vault(vault: &Option<VaultId>, id: &EntryId) -> Result<VaultId> {
    vault
        .clone()
        .ok_or_else(|| SyncError::NotFound(format!("entry {id} was not applied")))
}

/// Insert a new entry.
#[derive(Debug)]
pub struct CreateEntry {
    entry: CredentialEntry,
}

impl CreateEntry {
    pub fn new(entry: CredentialEntry) -> Self {
        Self { entry }
    }

    /// The client-assigned id.
    pub fn provisional_id(&self) -> &EntryId {
        &self.entry.id
    }
}

#[async_trait]
impl Command for CreateEntry {
    /// The id the store assigned, which may differ from the provisional one.
    type Output = EntryId;

    fn name(&self) -> &'static str {
        "create"
    }

    fn footprint(&self) -> Footprint {
        Footprint::Entry(self.entry.id.clone())
    }

    fn apply(&mut self, state: &mut CacheState) -> Result<()> {
        if state.vault(&self.entry.vault_id).is_none() {
            return Err(SyncError::Validation(format!(
                "unknown vault {}",
                self.entry.vault_id
            )));
        }
        if state.entry(&self.entry.id).is_some() {
            return Err(SyncError::Validation(format!(
                "entry {} already exists",
                self.entry.id
            )));
        }
        state.entries.push(self.entry.clone());
        Ok(())
    }

    async fn commit(&self, repo: &dyn VaultRepository, user: &UserId) -> Result<EntryId> {
        Ok(repo
            .create_entry(user, &self.entry.vault_id, self.entry.clone())
            .await?)
    }
}

/// Apply a fixed patch to an existing entry (edit, trash, restore).
#[derive(Debug)]
pub struct PatchEntry {
    name: &'static str,
    id: EntryId,
    patch: EntryPatch,
    vault: Option<VaultId>,
}

impl PatchEntry {
    /// Replace fields of an entry.
    pub fn update(id: EntryId, patch: EntryPatch) -> Self {
        Self {
            name: "update",
            id,
            patch,
            vault: None,
        }
    }

    /// Move an entry to the trash.
    pub fn trash(id: EntryId, now: DateTime<Utc>) -> Self {
        Self {
            name: "trash",
            id,
            patch: EntryPatch::trash(now),
            vault: None,
        }
    }

    /// Bring an entry back from the trash.
    pub fn restore(id: EntryId, now: DateTime<Utc>) -> Self {
        Self {
            name: "restore",
            id,
            patch: EntryPatch::restore(now),
            vault: None,
        }
    }
}

#[async_trait]
impl Command for PatchEntry {
    type Output = ();

    fn name(&self) -> &'static str {
        self.name
    }

    fn footprint(&self) -> Footprint {
        Footprint::Entry(self.id.clone())
    }

    fn apply(&mut self, state: &mut CacheState) -> Result<()> {
        let entry = state
            .entry_mut(&self.id)
            .ok_or_else(|| SyncError::NotFound(format!("entry {}", self.id)))?;
        self.patch.apply_to(entry);
        self.vault = Some(entry.vault_id.clone());
        Ok(())
    }

    async fn commit(&self, repo: &dyn VaultRepository, user: &UserId) -> Result<()> {
        let vault = applied_vault(&self.vault, &self.id)?;
        repo.update_entry(user, &vault, &self.id, &self.patch).await?;
        Ok(())
    }
}

/// Flip the favorite flag of an entry as it is at apply time.
#[derive(Debug)]
pub struct ToggleFavorite {
    id: EntryId,
    now: DateTime<Utc>,
    patch: Option<EntryPatch>,
    vault: Option<VaultId>,
}

impl ToggleFavorite {
    pub fn new(id: EntryId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            now,
            patch: None,
            vault: None,
        }
    }
}

#[async_trait]
impl Command for ToggleFavorite {
    type Output = ();

    fn name(&self) -> &'static str {
        "favorite"
    }

    fn footprint(&self) -> Footprint {
        Footprint::Entry(self.id.clone())
    }

    fn apply(&mut self, state: &mut CacheState) -> Result<()> {
        let entry = state
            .entry_mut(&self.id)
            .ok_or_else(|| SyncError::NotFound(format!("entry {}", self.id)))?;
        let patch = EntryPatch::favorite(self.now, !entry.is_favorite);
        patch.apply_to(entry);
        self.vault = Some(entry.vault_id.clone());
        self.patch = Some(patch);
        Ok(())
    }

    async fn commit(&self, repo: &dyn VaultRepository, user: &UserId) -> Result<()> {
        let vault = applied_vault(&self.vault, &self.id)?;
        let patch = self
            .patch
            .as_ref()
            .ok_or_else(|| SyncError::NotFound(format!("entry {} was not applied", self.id)))?;
        repo.update_entry(user, &vault, &self.id, patch).await?;
        Ok(())
    }
}

/// Remove an entry for good.
#[derive(Debug)]
pub struct PurgeEntry {
    id: EntryId,
    vault: Option<VaultId>,
}

impl PurgeEntry {
    pub fn new(id: EntryId) -> Self {
        Self { id, vault: None }
    }
}

#[async_trait]
impl Command for PurgeEntry {
    type Output = ();

    fn name(&self) -> &'static str {
        "purge"
    }

    fn footprint(&self) -> Footprint {
        Footprint::Entry(self.id.clone())
    }

    fn apply(&mut self, state: &mut CacheState) -> Result<()> {
        let vault = state.require_entry(&self.id)?.vault_id.clone();
        if state.vault(&vault).is_none() {
            return Err(SyncError::NotFound(format!(
                "vault {vault} of entry {}",
                self.id
            )));
        }
        state.remove_entry(&self.id);
        self.vault = Some(vault);
        Ok(())
    }

    async fn commit(&self, repo: &dyn VaultRepository, user: &UserId) -> Result<()> {
        let vault = applied_vault(&self.vault, &self.id)?;
        repo.delete_entry(user, &vault, &self.id).await?;
        Ok(())
    }
}

/// Create a vault, shown under a provisional id until the store answers.
#[derive(Debug)]
pub struct AddVault {
    provisional: Vault,
}

impl AddVault {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            provisional: Vault::new(name),
        }
    }

    /// The placeholder shown until the store answers.
    pub fn provisional(&self) -> &Vault {
        &self.provisional
    }
}

#[async_trait]
impl Command for AddVault {
    /// The vault as created by the store.
    type Output = Vault;

    fn name(&self) -> &'static str {
        "add_vault"
    }

    fn footprint(&self) -> Footprint {
        Footprint::Vault(self.provisional.id.clone())
    }

    fn apply(&mut self, state: &mut CacheState) -> Result<()> {
        state.vaults.push(self.provisional.clone());
        Ok(())
    }

    async fn commit(&self, repo: &dyn VaultRepository, user: &UserId) -> Result<Vault> {
        Ok(repo.create_vault(user, &self.provisional.name).await?)
    }
}
