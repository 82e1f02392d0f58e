//! In-process document store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use cipher_vault_core::{ApiToken, CredentialEntry, EntryId, EntryPatch, TokenId, UserId, Vault, VaultId};
use tokio::sync::RwLock;
use tracing::debug;

use super::{RepositoryResult, TokenRepository, UserDocument, VaultRepository};
use crate::error::RepositoryError;

/// In-memory repository.
///
/// [`set_offline`](Self::set_offline) makes every call fail with a
/// transport error until cleared, which is how rollback paths are exercised.
pub struct MemoryRepository {
    users: RwLock<HashMap<UserId, UserDocument>>,
    offline: AtomicBool,
}

impl Default for MemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            offline: AtomicBool::new(false),
        }
    }

    /// Simulate loss of connectivity.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Copy of a user's stored document.
    pub async fn document(&self, user: &UserId) -> UserDocument {
        let users = self.users.read().await;
        users.get(user).cloned().unwrap_or_default()
    }

    fn check(&self) -> RepositoryResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(RepositoryError::Transport("store is offline".to_string()));
        }
        Ok(())
    }

    async fn read<R>(
        &self,
        user: &UserId,
        f: impl FnOnce(&UserDocument) -> RepositoryResult<R>,
    ) -> RepositoryResult<R> {
        self.check()?;
        let users = self.users.read().await;
        match users.get(user) {
            Some(doc) => f(doc),
            None => f(&UserDocument::default()),
        }
    }

    async fn write<R>(
        &self,
        user: &UserId,
        f: impl FnOnce(&mut UserDocument) -> RepositoryResult<R>,
    ) -> RepositoryResult<R> {
        self.check()?;
        let mut users = self.users.write().await;
        f(users.entry(user.clone()).or_default())
    }
}

#[async_trait]
impl VaultRepository for MemoryRepository {
    async fn list_vaults(&self, user: &UserId) -> RepositoryResult<Vec<Vault>> {
        self.read(user, |doc| Ok(doc.vaults())).await
    }

    async fn create_vault(&self, user: &UserId, name: &str) -> RepositoryResult<Vault> {
        let vault = self.write(user, |doc| Ok(doc.create_vault(name))).await?;
        debug!(user = %user, vault = %vault.id, "memory store created vault");
        Ok(vault)
    }

    async fn list_entries(
        &self,
        user: &UserId,
        vault: &VaultId,
    ) -> RepositoryResult<Vec<CredentialEntry>> {
        self.read(user, |doc| doc.entries(vault)).await
    }

    async fn create_entry(
        &self,
        user: &UserId,
        vault: &VaultId,
        entry: CredentialEntry,
    ) -> RepositoryResult<EntryId> {
        self.write(user, |doc| doc.insert_entry(vault, entry)).await
    }

    async fn update_entry(
        &self,
        user: &UserId,
        vault: &VaultId,
        id: &EntryId,
        patch: &EntryPatch,
    ) -> RepositoryResult<()> {
        self.write(user, |doc| doc.update_entry(vault, id, patch)).await
    }

    async fn delete_entry(
        &self,
        user: &UserId,
        vault: &VaultId,
        id: &EntryId,
    ) -> RepositoryResult<()> {
        self.write(user, |doc| doc.delete_entry(vault, id)).await
    }
}

#[async_trait]
impl TokenRepository for MemoryRepository {
    async fn list_tokens(&self, user: &UserId) -> RepositoryResult<Vec<ApiToken>> {
        self.read(user, |doc| Ok(doc.tokens.clone())).await
    }

    async fn put_token(&self, user: &UserId, token: ApiToken) -> RepositoryResult<()> {
        self.write(user, |doc| {
            doc.put_token(token);
            Ok(())
        })
        .await
    }

    async fn delete_token(&self, user: &UserId, id: &TokenId) -> RepositoryResult<()> {
        self.write(user, |doc| {
            doc.delete_token(id);
            Ok(())
        })
        .await
    }
}
