//! Local JSON document store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use cipher_vault_core::{
    id, ApiToken, Config, ConfigError, CredentialEntry, EntryId, EntryPatch, TokenId, UserId,
    Vault, VaultId,
};
use tokio::sync::Mutex;
use tracing::debug;

use super::{RepositoryResult, TokenRepository, UserDocument, VaultRepository};
use crate::error::RepositoryError;

/// File-backed repository: one JSON document per user under `dir`.
///
/// Every write rewrites the user's document atomically (write to tmp, then
/// rename) with mode 0600 on Unix. Calls are serialized by an internal lock.
pub struct FileRepository {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl FileRepository {
    /// Create a repository rooted at `dir`. The directory is created lazily.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock: Mutex::new(()),
        }
    }

    /// Create a repository at the configured `storage.data_dir`.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self::new(config.data_dir()?))
    }

    /// Directory holding the user documents.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of a user's document.
    pub fn document_path(&self, user: &UserId) -> RepositoryResult<PathBuf> {
        if !id::is_valid_id(user.as_str()) {
            return Err(RepositoryError::PermissionDenied(format!(
                "invalid user id: {user}"
            )));
        }
        Ok(self.dir.join(format!("{user}.json")))
    }

    async fn load(&self, path: &Path) -> RepositoryResult<UserDocument> {
        if !tokio::fs::try_exists(path).await? {
            return Ok(UserDocument::default());
        }
        let data = tokio::fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&data)?)
    }

    async fn ensure_dir(&self) -> RepositoryResult<()> {
        tokio::fs::create_dir_all(&self.dir).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o700);
            tokio::fs::set_permissions(&self.dir, perms).await?;
        }

        Ok(())
    }

    async fn save(&self, path: &Path, doc: &UserDocument) -> RepositoryResult<()> {
        self.ensure_dir().await?;

        let tmp_path = path.with_extension("tmp");
        let data = serde_json::to_string_pretty(doc)?;
        tokio::fs::write(&tmp_path, data).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            tokio::fs::set_permissions(&tmp_path, perms).await?;
        }

        tokio::fs::rename(&tmp_path, path).await?;
        Ok(())
    }

    async fn read<R>(
        &self,
        user: &UserId,
        f: impl FnOnce(&UserDocument) -> RepositoryResult<R>,
    ) -> RepositoryResult<R> {
        let path = self.document_path(user)?;
        let _guard = self.lock.lock().await;
        let doc = self.load(&path).await?;
        f(&doc)
    }

    async fn write<R>(
        &self,
        user: &UserId,
        f: impl FnOnce(&mut UserDocument) -> RepositoryResult<R>,
    ) -> RepositoryResult<R> {
        let path = self.document_path(user)?;
        let _guard = self.lock.lock().await;
        let mut doc = self.load(&path).await?;
        let out = f(&mut doc)?;
        self.save(&path, &doc).await?;
        debug!(user = %user, path = %path.display(), "saved user document");
        Ok(out)
    }
}

#[async_trait]
impl VaultRepository for FileRepository {
    async fn list_vaults(&self, user: &UserId) -> RepositoryResult<Vec<Vault>> {
        self.read(user, |doc| Ok(doc.vaults())).await
    }

    async fn create_vault(&self, user: &UserId, name: &str) -> RepositoryResult<Vault> {
        self.write(user, |doc| Ok(doc.create_vault(name))).await
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
impl TokenRepository for FileRepository {
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
