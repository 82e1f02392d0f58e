//! API token management.
//!
//! Tokens are written straight through to the repository. There is no
//! optimistic cache for them.

use std::sync::Arc;

use chrono::Utc;
use cipher_vault_core::{ApiToken, SecretString, TokenId, UserId};
use cipher_vault_crypto::{Cipher, DecryptedSecret};
use tracing::info;

use crate::error::SyncError;
use crate::repository::TokenRepository;
use crate::Result;

pub struct TokenService {
    repo: Arc<dyn TokenRepository>,
    cipher: Cipher,
}

impl TokenService {
    pub fn new(repo: Arc<dyn TokenRepository>, cipher: Cipher) -> Self {
        Self { repo, cipher }
    }

    /// Tokens sorted by name.
    pub async fn list(&self, user: &UserId) -> Result<Vec<ApiToken>> {
        let mut tokens = self.repo.list_tokens(user).await?;
        tokens.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(tokens)
    }

    /// Find a token by id or exact name.
    pub async fn find(&self, user: &UserId, key: &str) -> Result<ApiToken> {
        self.repo
            .list_tokens(user)
            .await?
            .into_iter()
            .find(|t| t.id.as_str() == key || t.name == key)
            .ok_or_else(|| SyncError::NotFound(format!("token {key}")))
    }

    /// Create a token, or rename an existing one and replace its value.
    ///
    /// A value is required on create. On update an empty value keeps the
    /// stored one.
    pub async fn add_or_update(
        &self,
        user: &UserId,
        name: &str,
        value: &SecretString,
        id: Option<&TokenId>,
    ) -> Result<ApiToken> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SyncError::Validation("token name is required".to_string()));
        }
        if id.is_none() && value.is_empty() {
            return Err(SyncError::Validation("token value is required".to_string()));
        }

        let now = Utc::now();
        let token = match id {
            Some(id) => {
                let existing = self.find(user, id.as_str()).await?;
                let value = if value.is_empty() {
                    existing.value.clone()
                } else {
                    self.cipher.encrypt_secret(value)?
                };
                ApiToken {
                    name: name.to_string(),
                    value,
                    updated_at: now,
                    ..existing
                }
            }
            None => ApiToken {
                id: TokenId::generate(),
                name: name.to_string(),
                value: self.cipher.encrypt_secret(value)?,
                created_at: now,
                updated_at: now,
            },
        };

        self.repo.put_token(user, token.clone()).await?;
        info!(user = %user, token = %token.id, "token saved");
        Ok(token)
    }

    pub async fn delete(&self, user: &UserId, id: &TokenId) -> Result<()> {
        self.repo.delete_token(user, id).await?;
        info!(user = %user, token = %id, "token deleted");
        Ok(())
    }

    /// Decrypt a token value, falling back to the stored value.
    pub fn reveal(&self, token: &ApiToken) -> DecryptedSecret {
        self.cipher.reveal(&token.value)
    }
}
