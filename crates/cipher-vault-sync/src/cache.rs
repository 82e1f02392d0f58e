//! The reactive in-memory cache of vaults and entries.

use std::sync::Arc;

use cipher_vault_core::{CredentialEntry, EntryId, Vault, VaultId};
use parking_lot::Mutex;
use tokio::sync::watch;

use crate::error::SyncError;
use crate::Result;

/// One consistent view of a user's vaults and their flattened entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheState {
    pub vaults: Vec<Vault>,
    pub entries: Vec<CredentialEntry>,
}

impl CacheState {
    pub fn vault(&self, id: &VaultId) -> Option<&Vault> {
        self.vaults.iter().find(|v| &v.id == id)
    }

    pub fn entry(&self, id: &EntryId) -> Option<&CredentialEntry> {
        self.entries.iter().find(|e| &e.id == id)
    }

    pub fn entry_mut(&mut self, id: &EntryId) -> Option<&mut CredentialEntry> {
        self.entries.iter_mut().find(|e| &e.id == id)
    }

    /// Look up an entry or fail with `NotFound`.
    pub fn require_entry(&self, id: &EntryId) -> Result<&CredentialEntry> {
        self.entry(id)
            .ok_or_else(|| SyncError::NotFound(format!("entry {id}")))
    }

    /// Entries not in the trash.
    pub fn active_entries(&self) -> Vec<CredentialEntry> {
        self.entries.iter().filter(|e| e.is_active()).cloned().collect()
    }

    /// Entries in the trash.
    pub fn trashed_entries(&self) -> Vec<CredentialEntry> {
        self.entries.iter().filter(|e| e.is_trashed()).cloned().collect()
    }

    /// Remove an entry, returning it.
    pub fn remove_entry(&mut self, id: &EntryId) -> Option<CredentialEntry> {
        let pos = self.entries.iter().position(|e| &e.id == id)?;
        Some(self.entries.remove(pos))
    }

    /// Rename an entry after the store assigned a different id.
    pub fn rekey_entry(&mut self, from: &EntryId, to: &EntryId) {
        if let Some(entry) = self.entry_mut(from) {
            entry.id = to.clone();
        }
    }

    /// Put the part of the state named by `footprint` back the way it was
    /// in `before`, leaving everything else alone.
    pub fn revert(&mut self, before: &CacheState, footprint: &Footprint) {
        match footprint {
            Footprint::Entry(id) => {
                let prior = before.entries.iter().position(|e| &e.id == id);
                let current = self.entries.iter().position(|e| &e.id == id);
                match (prior, current) {
                    (Some(p), Some(c)) => self.entries[c] = before.entries[p].clone(),
                    (Some(p), None) => {
                        let at = p.min(self.entries.len());
                        self.entries.insert(at, before.entries[p].clone());
                    }
                    (None, Some(c)) => {
                        self.entries.remove(c);
                    }
                    (None, None) => {}
                }
            }
            Footprint::Vault(id) => {
                let prior = before.vaults.iter().position(|v| &v.id == id);
                let current = self.vaults.iter().position(|v| &v.id == id);
                match (prior, current) {
                    (Some(p), Some(c)) => self.vaults[c] = before.vaults[p].clone(),
                    (Some(p), None) => {
                        let at = p.min(self.vaults.len());
                        self.vaults.insert(at, before.vaults[p].clone());
                    }
                    (None, Some(c)) => {
                        self.vaults.remove(c);
                    }
                    (None, None) => {}
                }
            }
        }
    }

    /// Rename a vault after the store assigned a different id.
    pub fn rekey_vault(&mut self, from: &VaultId, to: &VaultId) {
        for vault in self.vaults.iter_mut().filter(|v| &v.id == from) {
            vault.id = to.clone();
        }
        for entry in self.entries.iter_mut().filter(|e| &e.vault_id == from) {
            entry.vault_id = to.clone();
        }
    }
}

/// The part of the cache one mutation touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Footprint {
    Entry(EntryId),
    Vault(VaultId),
}

/// Outcome of [`Cache::apply`].
#[derive(Debug)]
pub struct Applied<R> {
    /// The state current before the mutation.
    pub before: Arc<CacheState>,
    /// The state the mutation published.
    pub published: Arc<CacheState>,
    pub output: R,
}

/// Shared, observable cache.
///
/// Snapshots are immutable `Arc`s. Writers build the next state from a clone
/// of the current one and publish it whole, so a snapshot taken before a
/// mutation can be republished unchanged to roll it back.
pub struct Cache {
    tx: watch::Sender<Arc<CacheState>>,
    write: Mutex<()>,
}

impl Default for Cache {
    fn default() -> Self {
        Self::new()
    }
}

impl Cache {
    /// Create an empty cache.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Arc::new(CacheState::default()));
        Self {
            tx,
            write: Mutex::new(()),
        }
    }

    /// Current state.
    pub fn snapshot(&self) -> Arc<CacheState> {
        self.tx.borrow().clone()
    }

    /// Observe every published state.
    pub fn subscribe(&self) -> watch::Receiver<Arc<CacheState>> {
        self.tx.subscribe()
    }

    /// Compute and publish the next state.
    ///
    /// When `f` fails nothing is published.
    pub fn apply<R>(&self, f: impl FnOnce(&mut CacheState) -> Result<R>) -> Result<Applied<R>> {
        let _guard = self.write.lock();
        let before = self.snapshot();
        let mut next = (*before).clone();
        let output = f(&mut next)?;
        let published = Arc::new(next);
        self.tx.send_replace(published.clone());
        Ok(Applied {
            before,
            published,
            output,
        })
    }

    /// Publish `f` applied to the current state, for changes that cannot fail.
    pub fn modify(&self, f: impl FnOnce(&mut CacheState)) {
        let _guard = self.write.lock();
        let mut next = (*self.snapshot()).clone();
        f(&mut next);
        self.tx.send_replace(Arc::new(next));
    }

    /// Replace the whole state.
    pub fn replace(&self, state: CacheState) {
        let _guard = self.write.lock();
        self.tx.send_replace(Arc::new(state));
    }

    /// Undo a published mutation.
    ///
    /// If nothing was published since, `before` is republished as is.
    /// Otherwise only the `footprint` of the mutation is reverted, so later
    /// changes to other entries and vaults survive.
    pub fn rollback<R>(&self, applied: &Applied<R>, footprint: &Footprint) {
        let _guard = self.write.lock();
        let current = self.snapshot();
        if Arc::ptr_eq(&current, &applied.published) {
            self.tx.send_replace(applied.before.clone());
            return;
        }
        let mut next = (*current).clone();
        next.revert(&applied.before, footprint);
        self.tx.send_replace(Arc::new(next));
    }

    /// Drop everything.
    pub fn clear(&self) {
        self.replace(CacheState::default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_publishes_and_returns_previous() {
        let cache = Cache::new();
        let vault = Vault::with_id("v1", "Personal");

        let applied = cache
            .apply(|s| {
                s.vaults.push(vault.clone());
                Ok(())
            })
            .unwrap();

        assert!(applied.before.vaults.is_empty());
        assert!(Arc::ptr_eq(&applied.published, &cache.snapshot()));
        assert_eq!(cache.snapshot().vaults, vec![vault]);
    }

    #[test]
    fn test_failed_apply_publishes_nothing() {
        let cache = Cache::new();
        let before = cache.snapshot();

        let result = cache.apply(|s| -> Result<()> {
            s.vaults.push(Vault::with_id("v1", "Personal"));
            Err(SyncError::Validation("no".to_string()))
        });

        assert!(result.is_err());
        assert!(Arc::ptr_eq(&before, &cache.snapshot()));
    }

    fn entry(id: &str) -> CredentialEntry {
        let now = chrono::Utc::now();
        CredentialEntry {
            id: EntryId::new(id),
            vault_id: VaultId::new("v1"),
            service_name: id.to_string(),
            url: None,
            username: "me".to_string(),
            secret: "ct".to_string(),
            notes: None,
            tags: Default::default(),
            is_favorite: false,
            created_at: now,
            updated_at: now,
            deleted_at: None,
            secret_history: Vec::new(),
        }
    }

    fn seeded() -> Cache {
        let cache = Cache::new();
        cache.modify(|s| {
            s.vaults.push(Vault::with_id("v1", "Personal"));
            s.entries.push(entry("a"));
            s.entries.push(entry("b"));
        });
        cache
    }

    fn favorite(cache: &Cache, id: &str) -> Applied<()> {
        cache
            .apply(|s| {
                s.entry_mut(&EntryId::new(id)).unwrap().is_favorite = true;
                Ok(())
            })
            .unwrap()
    }

    #[test]
    fn test_rollback_without_interleaving_republishes_snapshot() {
        let cache = seeded();
        let applied = cache
            .apply(|s| {
                s.vaults.clear();
                Ok(())
            })
            .unwrap();

        cache.rollback(&applied, &Footprint::Vault(VaultId::new("v1")));

        assert!(Arc::ptr_eq(&applied.before, &cache.snapshot()));
    }

    #[test]
    fn test_rollback_keeps_later_changes_to_other_entries() {
        let cache = seeded();
        let a = favorite(&cache, "a");
        favorite(&cache, "b");

        cache.rollback(&a, &Footprint::Entry(EntryId::new("a")));

        let state = cache.snapshot();
        assert!(!state.entry(&EntryId::new("a")).unwrap().is_favorite);
        assert!(state.entry(&EntryId::new("b")).unwrap().is_favorite);
    }

    #[test]
    fn test_rollback_reinserts_purged_entry_in_place() {
        let cache = seeded();
        let purge = cache
            .apply(|s| {
                s.remove_entry(&EntryId::new("a"));
                Ok(())
            })
            .unwrap();
        favorite(&cache, "b");

        cache.rollback(&purge, &Footprint::Entry(EntryId::new("a")));

        let ids: Vec<_> = cache
            .snapshot()
            .entries
            .iter()
            .map(|e| e.id.to_string())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(cache.snapshot().entries[1].is_favorite);
    }

    #[test]
    fn test_rollback_drops_provisional_vault_only() {
        let cache = seeded();
        let add = cache
            .apply(|s| {
                s.vaults.push(Vault::with_id("tmp", "Work"));
                Ok(())
            })
            .unwrap();
        favorite(&cache, "a");

        cache.rollback(&add, &Footprint::Vault(VaultId::new("tmp")));

        let state = cache.snapshot();
        assert!(state.vault(&VaultId::new("tmp")).is_none());
        assert!(state.entry(&EntryId::new("a")).unwrap().is_favorite);
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let cache = Cache::new();
        let mut rx = cache.subscribe();

        cache.modify(|s| s.vaults.push(Vault::with_id("v1", "Personal")));

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().vaults.len(), 1);
    }

    #[test]
    fn test_rekey_vault_moves_entries() {
        let mut state = CacheState {
            vaults: vec![Vault::with_id("tmp", "Work")],
            entries: Vec::new(),
        };
        state.rekey_vault(&VaultId::new("tmp"), &VaultId::new("real"));
        assert!(state.vault(&VaultId::new("real")).is_some());
        assert!(state.vault(&VaultId::new("tmp")).is_none());
    }
}
