//! The document store contract and its implementations.
//!
//! The engine never talks to storage directly. Every read and write goes
//! through [`VaultRepository`] (and [`TokenRepository`] for API tokens), so
//! the remote store can be swapped for the in-memory or file-backed stores
//! provided here.

mod document;
mod file;
mod memory;

pub use document::{UserDocument, VaultDocument};
pub use file::FileRepository;
pub use memory::MemoryRepository;

use async_trait::async_trait;
use cipher_vault_core::{ApiToken, CredentialEntry, EntryId, EntryPatch, TokenId, UserId, Vault, VaultId};

use crate::error::RepositoryError;

/// Result type for repository calls.
pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

/// Per-user vault and entry storage.
///
/// Entry records carry the secret as ciphertext. Any call may fail with a
/// transport or permission error.
#[async_trait]
pub trait VaultRepository: Send + Sync {
    /// List the user's vaults in creation order.
    async fn list_vaults(&self, user: &UserId) -> RepositoryResult<Vec<Vault>>;

    /// Create a vault. The store assigns the id.
    async fn create_vault(&self, user: &UserId, name: &str) -> RepositoryResult<Vault>;

    /// List every entry (active and trashed) of one vault.
    async fn list_entries(
        &self,
        user: &UserId,
        vault: &VaultId,
    ) -> RepositoryResult<Vec<CredentialEntry>>;

    /// Store a new entry and return the id it was stored under. A non-empty
    /// client-assigned id is kept; an empty one is replaced.
    async fn create_entry(
        &self,
        user: &UserId,
        vault: &VaultId,
        entry: CredentialEntry,
    ) -> RepositoryResult<EntryId>;

    /// Apply a partial update to an existing entry.
    async fn update_entry(
        &self,
        user: &UserId,
        vault: &VaultId,
        id: &EntryId,
        patch: &EntryPatch,
    ) -> RepositoryResult<()>;

    /// Remove an entry for good.
    async fn delete_entry(&self, user: &UserId, vault: &VaultId, id: &EntryId)
        -> RepositoryResult<()>;
}

/// Per-user API token storage.
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// List the user's tokens.
    async fn list_tokens(&self, user: &UserId) -> RepositoryResult<Vec<ApiToken>>;

    /// Insert or replace a token by id.
    async fn put_token(&self, user: &UserId, token: ApiToken) -> RepositoryResult<()>;

    /// Remove a token.
    async fn delete_token(&self, user: &UserId, id: &TokenId) -> RepositoryResult<()>;
}
