//! Credential entries, their drafts, and partial updates.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{EntryId, VaultId};
use crate::secret::SecretString;

/// Maximum number of prior secrets kept per entry.
pub const MAX_HISTORY_ENTRIES: usize = 10;

/// One stored service login.
///
/// `secret` always holds the value as persisted (ciphertext when a cipher
/// key is configured). Plaintext only exists transiently after an explicit
/// decrypt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialEntry {
    pub id: EntryId,
    pub vault_id: VaultId,
    pub service_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub username: String,
    pub secret: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
    /// Prior secrets, newest first, at most [`MAX_HISTORY_ENTRIES`].
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub secret_history: Vec<SecretHistoryEntry>,
}

/// Lifecycle state of an entry still present in the store.
///
/// Purged entries no longer exist anywhere, so there is no variant for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    Active,
    Trashed,
}

impl CredentialEntry {
    /// True when the entry has not been moved to the trash.
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }

    /// True when the entry sits in the trash.
    pub fn is_trashed(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> EntryState {
        if self.is_active() {
            EntryState::Active
        } else {
            EntryState::Trashed
        }
    }

    /// Record `previous` (as persisted) at the head of the history,
    /// dropping the oldest entries beyond the cap.
    pub fn push_history(&mut self, previous: String, at: DateTime<Utc>) {
        self.secret_history.insert(
            0,
            SecretHistoryEntry {
                secret: previous,
                timestamp: at,
            },
        );
        self.secret_history.truncate(MAX_HISTORY_ENTRIES);
    }
}

/// A secret the entry used before, stored the same way as the live secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretHistoryEntry {
    pub secret: String,
    pub timestamp: DateTime<Utc>,
}

/// User-supplied fields for creating or editing an entry.
///
/// The secret is plaintext here; it is encrypted before it reaches the
/// cache or the store.
#[derive(Debug, Clone, Default)]
pub struct EntryDraft {
    /// Target vault. Falls back to the selected vault on create.
    pub vault_id: Option<VaultId>,
    pub service_name: String,
    pub url: Option<String>,
    pub username: String,
    pub secret: SecretString,
    pub notes: Option<String>,
    pub tags: Vec<String>,
    pub is_favorite: bool,
}

impl EntryDraft {
    /// Start a draft with the required fields.
    pub fn new(
        service_name: impl Into<String>,
        username: impl Into<String>,
        secret: impl Into<SecretString>,
    ) -> Self {
        Self {
            service_name: service_name.into(),
            username: username.into(),
            secret: secret.into(),
            ..Self::default()
        }
    }

    /// Set the target vault.
    pub fn in_vault(mut self, vault_id: impl Into<VaultId>) -> Self {
        self.vault_id = Some(vault_id.into());
        self
    }

    /// Set the service URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set free-form notes.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Add a tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Mark as favorite.
    pub fn favorite(mut self, is_favorite: bool) -> Self {
        self.is_favorite = is_favorite;
        self
    }

    /// Tags trimmed, de-duplicated, with empty tags dropped.
    pub fn normalized_tags(&self) -> BTreeSet<String> {
        self.tags
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// A partial update sent to the store.
///
/// `updated_at` is mandatory so every mutation refreshes it. Nested
/// options distinguish "leave alone" (`None`) from "clear" (`Some(None)`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPatch {
    pub service_name: Option<String>,
    pub url: Option<Option<String>>,
    pub username: Option<String>,
    pub secret: Option<String>,
    pub notes: Option<Option<String>>,
    pub tags: Option<BTreeSet<String>>,
    pub is_favorite: Option<bool>,
    pub deleted_at: Option<Option<DateTime<Utc>>>,
    pub secret_history: Option<Vec<SecretHistoryEntry>>,
    pub updated_at: DateTime<Utc>,
}

impl EntryPatch {
    /// A patch that only refreshes `updated_at`.
    pub fn touch(now: DateTime<Utc>) -> Self {
        Self {
            service_name: None,
            url: None,
            username: None,
            secret: None,
            notes: None,
            tags: None,
            is_favorite: None,
            deleted_at: None,
            secret_history: None,
            updated_at: now,
        }
    }

    /// Move to the trash at `now`.
    pub fn trash(now: DateTime<Utc>) -> Self {
        Self {
            deleted_at: Some(Some(now)),
            ..Self::touch(now)
        }
    }

    /// Bring back from the trash.
    pub fn restore(now: DateTime<Utc>) -> Self {
        Self {
            deleted_at: Some(None),
            ..Self::touch(now)
        }
    }

    /// Set the favorite flag.
    pub fn favorite(now: DateTime<Utc>, is_favorite: bool) -> Self {
        Self {
            is_favorite: Some(is_favorite),
            ..Self::touch(now)
        }
    }

    /// Apply the patch in place.
    pub fn apply_to(&self, entry: &mut CredentialEntry) {
        if let Some(v) = &self.service_name {
            entry.service_name = v.clone();
        }
        if let Some(v) = &self.url {
            entry.url = v.clone();
        }
        if let Some(v) = &self.username {
            entry.username = v.clone();
        }
        if let Some(v) = &self.secret {
            entry.secret = v.clone();
        }
        if let Some(v) = &self.notes {
            entry.notes = v.clone();
        }
        if let Some(v) = &self.tags {
            entry.tags = v.clone();
        }
        if let Some(v) = self.is_favorite {
            entry.is_favorite = v;
        }
        if let Some(v) = self.deleted_at {
            entry.deleted_at = v;
        }
        if let Some(v) = &self.secret_history {
            entry.secret_history = v.clone();
        }
        entry.updated_at = self.updated_at;
    }
}
