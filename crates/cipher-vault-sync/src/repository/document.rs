//! The per-user document shared by the bundled repositories.

use cipher_vault_core::{ApiToken, CredentialEntry, EntryId, EntryPatch, TokenId, Vault, VaultId};
use serde::{Deserialize, Serialize};

use super::RepositoryResult;
use crate::error::RepositoryError;

/// Everything stored for one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDocument {
    #[serde(default)]
    pub vaults: Vec<VaultDocument>,

    #[serde(default)]
    pub tokens: Vec<ApiToken>,
}

/// One vault with its entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultDocument {
    pub id: VaultId,
    pub name: String,
    #[serde(default)]
    pub entries: Vec<CredentialEntry>,
}

impl UserDocument {
    pub fn vaults(&self) -> Vec<Vault> {
        self.vaults
            .iter()
            .map(|v| Vault::with_id(v.id.clone(), v.name.clone()))
            .collect()
    }

    pub fn create_vault(&mut self, name: &str) -> Vault {
        let vault = Vault::new(name);
        self.vaults.push(VaultDocument {
            id: vault.id.clone(),
            name: vault.name.clone(),
            entries: Vec::new(),
        });
        vault
    }

    fn vault(&self, id: &VaultId) -> RepositoryResult<&VaultDocument> {
        self.vaults
            .iter()
            .find(|v| &v.id == id)
            .ok_or_else(|| RepositoryError::NotFound(format!("vault {id}")))
    }

    fn vault_mut(&mut self, id: &VaultId) -> RepositoryResult<&mut VaultDocument> {
        self.vaults
            .iter_mut()
            .find(|v| &v.id == id)
            .ok_or_else(|| RepositoryError::NotFound(format!("vault {id}")))
    }

    pub fn entries(&self, vault: &VaultId) -> RepositoryResult<Vec<CredentialEntry>> {
        Ok(self.vault(vault)?.entries.clone())
    }

    /// Insert `entry`, replacing any entry with the same id.
    pub fn insert_entry(
        &mut self,
        vault: &VaultId,
        mut entry: CredentialEntry,
    ) -> RepositoryResult<EntryId> {
        let doc = self.vault_mut(vault)?;
        if entry.id.as_str().is_empty() {
            entry.id = EntryId::generate();
        }
        entry.vault_id = vault.clone();

        let id = entry.id.clone();
        match doc.entries.iter_mut().find(|e| e.id == id) {
            Some(existing) => *existing = entry,
            None => doc.entries.push(entry),
        }
        Ok(id)
    }

    pub fn update_entry(
        &mut self,
        vault: &VaultId,
        id: &EntryId,
        patch: &EntryPatch,
    ) -> RepositoryResult<()> {
        let entry = self
            .vault_mut(vault)?
            .entries
            .iter_mut()
            .find(|e| &e.id == id)
            .ok_or_else(|| RepositoryError::NotFound(format!("entry {id}")))?;
        patch.apply_to(entry);
        Ok(())
    }

    /// Remove an entry. Removing an absent entry succeeds.
    pub fn delete_entry(&mut self, vault: &VaultId, id: &EntryId) -> RepositoryResult<()> {
        self.vault_mut(vault)?.entries.retain(|e| &e.id != id);
        Ok(())
    }

    pub fn put_token(&mut self, token: ApiToken) {
        match self.tokens.iter_mut().find(|t| t.id == token.id) {
            Some(existing) => *existing = token,
            None => self.tokens.push(token),
        }
    }

    pub fn delete_token(&mut self, id: &TokenId) {
        self.tokens.retain(|t| &t.id != id);
    }
}
