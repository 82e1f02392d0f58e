//! Filtering and sorting of the entry list.

use std::cmp::Ordering;

use cipher_vault_core::{CredentialEntry, VaultId};

/// Which slice of entries is shown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ViewFolder {
    /// Every active entry.
    #[default]
    All,
    /// Active favorites.
    Favorites,
    /// Trashed entries.
    Trash,
    /// Active entries of one vault.
    Vault(VaultId),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    ServiceName,
    CreatedAt,
    #[default]
    UpdatedAt,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// A list view: folder, optional tag, search text and sort.
///
/// A vault or favorites folder takes precedence over the tag filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewQuery {
    pub folder: ViewFolder,
    pub tag: Option<String>,
    pub favorites_only: bool,
    pub search: Option<String>,
    pub sort: SortKey,
    pub order: SortOrder,
}

impl ViewQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn folder(mut self, folder: ViewFolder) -> Self {
        self.folder = folder;
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn favorites_only(mut self, yes: bool) -> Self {
        self.favorites_only = yes;
        self
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn sort(mut self, key: SortKey, order: SortOrder) -> Self {
        self.sort = key;
        self.order = order;
        self
    }

    /// Entries matching the query, sorted.
    pub fn apply(&self, entries: &[CredentialEntry]) -> Vec<CredentialEntry> {
        let trash = self.folder == ViewFolder::Trash;
        let needle = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let mut out: Vec<CredentialEntry> = entries
            .iter()
            .filter(|e| e.is_trashed() == trash)
            .filter(|e| !self.favorites_only || e.is_favorite)
            .filter(|e| match &self.folder {
                ViewFolder::Vault(id) => &e.vault_id == id,
                ViewFolder::Favorites => e.is_favorite,
                ViewFolder::All | ViewFolder::Trash => match &self.tag {
                    Some(tag) => e.tags.contains(tag),
                    None => true,
                },
            })
            .filter(|e| needle.as_deref().map_or(true, |n| matches_search(e, n)))
            .cloned()
            .collect();

        out.sort_by(|a, b| {
            let ord = self.compare(a, b);
            match self.order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });
        out
    }

    fn compare(&self, a: &CredentialEntry, b: &CredentialEntry) -> Ordering {
        match self.sort {
            SortKey::ServiceName => a
                .service_name
                .to_lowercase()
                .cmp(&b.service_name.to_lowercase()),
            SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
            SortKey::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        }
    }
}

fn matches_search(entry: &CredentialEntry, needle: &str) -> bool {
    let hit = |s: &str| s.to_lowercase().contains(needle);
    hit(&entry.service_name)
        || hit(&entry.username)
        || entry.url.as_deref().is_some_and(hit)
        || entry.notes.as_deref().is_some_and(hit)
        || entry.tags.iter().any(|t| hit(t))
}
