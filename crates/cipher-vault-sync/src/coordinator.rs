//! The mutation coordinator: the single writer of the cache.

use std::sync::Arc;

use chrono::Utc;
use cipher_vault_core::{CredentialEntry, EntryDraft, EntryId, EntryPatch, UserId, Vault, VaultId};
use cipher_vault_crypto::{Cipher, DecryptedSecret};
use futures::future::try_join_all;
use parking_lot::RwLock;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::cache::{Cache, CacheState};
use crate::command::{AddVault, Command, CreateEntry, PatchEntry, PurgeEntry, ToggleFavorite};
use crate::error::SyncError;
use crate::history;
use crate::repository::VaultRepository;
use crate::session::Session;
use crate::validate::{normalized_optional, validate_draft, validate_vault_name};
use crate::Result;

#[derive(Debug, Default)]
struct SessionState {
    session: Option<Session>,
    selected_vault: Option<VaultId>,
}

/// Result of a bulk import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub created: Vec<EntryId>,
    pub failed: Vec<ImportFailure>,
}

/// A draft that could not be imported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportFailure {
    pub service_name: String,
    pub reason: String,
}

/// Owns the cache of one user session and applies every mutation to it
/// optimistically.
///
/// Each mutation captures the current snapshot, publishes the mutated state
/// at once, then writes to the repository. If the write fails the captured
/// snapshot is republished and the error returned. When other mutations
/// were published in the meantime, only the failed mutation's own entry or
/// vault is reverted. Concurrent mutations of the same entry are not
/// reconciled: the last write to reach the store wins.
pub struct VaultCoordinator {
    repo: Arc<dyn VaultRepository>,
    cipher: Cipher,
    cache: Cache,
    state: RwLock<SessionState>,
}

impl VaultCoordinator {
    pub fn new(repo: Arc<dyn VaultRepository>, cipher: Cipher) -> Self {
        Self {
            repo,
            cipher,
            cache: Cache::new(),
            state: RwLock::new(SessionState::default()),
        }
    }

    /// The cipher protecting secrets in this session.
    pub fn cipher(&self) -> &Cipher {
        &self.cipher
    }

    /// Bind to `session`: load its vaults (creating the default vault when
    /// there are none) and fetch every entry.
    pub async fn init(&self, session: Session) -> Result<()> {
        info!(user = %session.user_id, "starting vault session");
        {
            let mut state = self.state.write();
            state.session = Some(session.clone());
            state.selected_vault = None;
        }
        self.cache.clear();

        let result = self.load(&session).await;
        if result.is_err() {
            self.dispose();
        }
        result
    }

    async fn load(&self, session: &Session) -> Result<()> {
        let vaults = self.repo.list_vaults(&session.user_id).await?;
        if vaults.is_empty() {
            let vault = self
                .repo
                .create_vault(&session.user_id, &session.default_vault_name)
                .await?;
            info!(user = %session.user_id, vault = %vault.id, "created default vault");
        }
        self.refresh().await
    }

    /// Drop the session, the cache and the selection.
    pub fn dispose(&self) {
        let previous = {
            let mut state = self.state.write();
            state.selected_vault = None;
            state.session.take()
        };
        self.cache.clear();
        if let Some(session) = previous {
            info!(user = %session.user_id, "vault session disposed");
        }
    }

    /// The active session, if any.
    pub fn session(&self) -> Option<Session> {
        self.state.read().session.clone()
    }

    fn user(&self) -> Result<UserId> {
        self.state
            .read()
            .session
            .as_ref()
            .map(|s| s.user_id.clone())
            .ok_or(SyncError::NoSession)
    }

    /// Re-fetch every vault's entries and replace the cache.
    ///
    /// On failure the cache is left as it was.
    pub async fn refresh(&self) -> Result<()> {
        let user = self.user()?;
        let vaults = self.repo.list_vaults(&user).await?;
        let batches = try_join_all(
            vaults
                .iter()
                .map(|vault| self.repo.list_entries(&user, &vault.id)),
        )
        .await?;
        let entries: Vec<CredentialEntry> = batches.into_iter().flatten().collect();

        if self.session().map(|s| s.user_id) != Some(user.clone()) {
            debug!(user = %user, "session changed during refresh, discarding result");
            return Ok(());
        }

        info!(user = %user, vaults = vaults.len(), entries = entries.len(), "cache refreshed");
        {
            let mut state = self.state.write();
            if let Some(selected) = &state.selected_vault {
                if !vaults.iter().any(|v| &v.id == selected) {
                    state.selected_vault = None;
                }
            }
        }
        self.cache.replace(CacheState { vaults, entries });
        Ok(())
    }

    /// Observe cache snapshots.
    pub fn subscribe(&self) -> watch::Receiver<Arc<CacheState>> {
        self.cache.subscribe()
    }

    /// The current cache snapshot.
    pub fn snapshot(&self) -> Arc<CacheState> {
        self.cache.snapshot()
    }

    /// Select the vault new entries go to when a draft names none.
    pub fn select_vault(&self, vault: Option<VaultId>) -> Result<()> {
        if let Some(id) = &vault {
            if self.cache.snapshot().vault(id).is_none() {
                return Err(SyncError::NotFound(format!("vault {id}")));
            }
        }
        self.state.write().selected_vault = vault;
        Ok(())
    }

    pub fn selected_vault(&self) -> Option<VaultId> {
        self.state.read().selected_vault.clone()
    }

    /// Target vault for a new entry: the requested one, else the selected
    /// one, else the first vault.
    fn resolve_vault(&self, requested: Option<&VaultId>, state: &CacheState) -> Result<VaultId> {
        if let Some(id) = requested {
            return match state.vault(id) {
                Some(vault) => Ok(vault.id.clone()),
                None => Err(SyncError::Validation(format!("unknown vault {id}"))),
            };
        }
        self.selected_vault()
            .filter(|id| state.vault(id).is_some())
            .or_else(|| state.vaults.first().map(|v| v.id.clone()))
            .ok_or_else(|| SyncError::Validation("no vault available for the entry".to_string()))
    }

    /// Run `command` through apply, publish and commit, rolling back its
    /// footprint on a failed commit.
    async fn execute<C: Command>(&self, mut command: C) -> Result<C::Output> {
        let user = self.user()?;
        let op = command.name();

        let applied = self.cache.apply(|state| command.apply(state))?;
        debug!(user = %user, op, "applied optimistically");

        match command.commit(self.repo.as_ref(), &user).await {
            Ok(output) => {
                debug!(user = %user, op, "committed");
                Ok(output)
            }
            Err(e) => {
                warn!(user = %user, op, error = %e, "write failed, rolling back");
                self.cache.rollback(&applied, &command.footprint());
                Err(e)
            }
        }
    }

    /// Create an entry from `draft`, or replace the fields of entry `id`.
    ///
    /// Returns the id the entry is stored under.
    pub async fn create_or_update(&self, draft: EntryDraft, id: Option<&EntryId>) -> Result<EntryId> {
        self.user()?;
        validate_draft(&draft)?;
        match id {
            None => self.create(draft).await,
            Some(id) => self.update(id, draft).await,
        }
    }

    async fn create(&self, draft: EntryDraft) -> Result<EntryId> {
        let snapshot = self.cache.snapshot();
        let vault_id = self.resolve_vault(draft.vault_id.as_ref(), &snapshot)?;
        let now = Utc::now();

        let entry = CredentialEntry {
            id: EntryId::generate(),
            vault_id,
            service_name: draft.service_name.trim().to_string(),
            url: normalized_optional(draft.url.as_deref()),
            username: draft.username.trim().to_string(),
            secret: self.cipher.encrypt_secret(&draft.secret)?,
            notes: normalized_optional(draft.notes.as_deref()),
            tags: draft.normalized_tags(),
            is_favorite: draft.is_favorite,
            created_at: now,
            updated_at: now,
            deleted_at: None,
            secret_history: Vec::new(),
        };

        let command = CreateEntry::new(entry);
        let provisional = command.provisional_id().clone();
        let assigned = self.execute(command).await?;

        if assigned != provisional {
            debug!(from = %provisional, to = %assigned, "store assigned a different entry id");
            self.cache.modify(|s| s.rekey_entry(&provisional, &assigned));
        }
        info!(entry = %assigned, "entry created");
        Ok(assigned)
    }

    async fn update(&self, id: &EntryId, draft: EntryDraft) -> Result<EntryId> {
        let snapshot = self.cache.snapshot();
        let current = snapshot.require_entry(id)?;
        if let Some(vault) = &draft.vault_id {
            if vault != &current.vault_id {
                return Err(SyncError::Validation(
                    "entries cannot be moved between vaults".to_string(),
                ));
            }
        }

        let now = Utc::now();
        let mut patch = EntryPatch::touch(now);
        patch.service_name = Some(draft.service_name.trim().to_string());
        patch.url = Some(normalized_optional(draft.url.as_deref()));
        patch.username = Some(draft.username.trim().to_string());
        patch.notes = Some(normalized_optional(draft.notes.as_deref()));
        patch.tags = Some(draft.normalized_tags());
        patch.is_favorite = Some(draft.is_favorite);

        if let Some(history) = history::record_change(current, &draft.secret, &self.cipher, now) {
            patch.secret = Some(self.cipher.encrypt_secret(&draft.secret)?);
            patch.secret_history = Some(history);
        }

        self.execute(PatchEntry::update(id.clone(), patch)).await?;
        info!(entry = %id, "entry updated");
        Ok(id.clone())
    }

    /// Move an entry to the trash, or remove it for good.
    pub async fn trash(&self, id: &EntryId, permanent: bool) -> Result<()> {
        if permanent {
            self.execute(PurgeEntry::new(id.clone())).await?;
            info!(entry = %id, "entry purged");
        } else {
            self.execute(PatchEntry::trash(id.clone(), Utc::now()))
                .await?;
            info!(entry = %id, "entry trashed");
        }
        Ok(())
    }

    /// Bring an entry back from the trash.
    pub async fn restore(&self, id: &EntryId) -> Result<()> {
        self.execute(PatchEntry::restore(id.clone(), Utc::now()))
            .await?;
        info!(entry = %id, "entry restored");
        Ok(())
    }

    pub async fn toggle_favorite(&self, id: &EntryId) -> Result<()> {
        self.execute(ToggleFavorite::new(id.clone(), Utc::now()))
            .await
    }

    /// Create a vault and refresh the cache.
    pub async fn add_vault(&self, name: &str) -> Result<Vault> {
        let name = validate_vault_name(name)?;
        let command = AddVault::new(name);
        let provisional = command.provisional().id.clone();
        let vault = self.execute(command).await?;

        if let Err(e) = self.refresh().await {
            warn!(vault = %vault.id, error = %e, "refresh after vault creation failed");
            self.cache.modify(|s| s.rekey_vault(&provisional, &vault.id));
        }
        info!(vault = %vault.id, name = %vault.name, "vault created");
        Ok(vault)
    }

    /// Create every draft through the normal create path. `vault` overrides
    /// the drafts' target vault.
    pub async fn import(&self, drafts: Vec<EntryDraft>, vault: Option<&VaultId>) -> Result<ImportReport> {
        self.user()?;
        let mut report = ImportReport::default();

        for mut draft in drafts {
            if let Some(vault) = vault {
                draft.vault_id = Some(vault.clone());
            }
            let service_name = draft.service_name.clone();
            match self.create_or_update(draft, None).await {
                Ok(id) => report.created.push(id),
                Err(e) => {
                    warn!(service = %service_name, error = %e, "import of entry failed");
                    report.failed.push(ImportFailure {
                        service_name,
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            created = report.created.len(),
            failed = report.failed.len(),
            "import finished"
        );
        Ok(report)
    }

    /// Decrypt the secret of an entry.
    pub fn reveal(&self, id: &EntryId) -> Result<DecryptedSecret> {
        let snapshot = self.cache.snapshot();
        let entry = snapshot.require_entry(id)?;
        Ok(self.cipher.reveal(&entry.secret))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics;
    use crate::error::RepositoryError;
    use crate::repository::{MemoryRepository, RepositoryResult};
    use cipher_vault_core::SecretString;

    async fn setup() -> (Arc<MemoryRepository>, VaultCoordinator) {
        let repo = Arc::new(MemoryRepository::new());
        let coordinator = VaultCoordinator::new(repo.clone(), Cipher::with_key("test-key"));
        coordinator.init(Session::new("alice")).await.unwrap();
        (repo, coordinator)
    }

    fn draft(service: &str, secret: &str) -> EntryDraft {
        EntryDraft::new(service, "me", secret)
    }

    #[tokio::test]
    async fn test_init_creates_default_vault() {
        let (repo, coordinator) = setup().await;
        let snapshot = coordinator.snapshot();
        assert_eq!(snapshot.vaults.len(), 1);
        assert_eq!(snapshot.vaults[0].name, "Personal");
        assert_eq!(repo.list_vaults(&UserId::new("alice")).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_mutations_require_session() {
        let repo = Arc::new(MemoryRepository::new());
        let coordinator = VaultCoordinator::new(repo, Cipher::insecure());
        let err = coordinator
            .create_or_update(draft("GitHub", "pw"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::NoSession));
    }

    #[tokio::test]
    async fn test_create_encrypts_and_persists() {
        let (repo, coordinator) = setup().await;
        let id = coordinator
            .create_or_update(draft("GitHub", "hunter2").with_tag(" dev "), None)
            .await
            .unwrap();

        let snapshot = coordinator.snapshot();
        let entry = snapshot.entry(&id).unwrap();
        assert_ne!(entry.secret, "hunter2");
        assert!(entry.tags.contains("dev"));
        assert_eq!(entry.created_at, entry.updated_at);
        assert_eq!(coordinator.reveal(&id).unwrap().expose(), "hunter2");

        let stored = repo
            .list_entries(&UserId::new("alice"), &entry.vault_id)
            .await
            .unwrap();
        assert_eq!(stored, vec![entry.clone()]);
    }

    #[tokio::test]
    async fn test_create_without_vault_is_validation_error() {
        let (_repo, coordinator) = setup().await;
        coordinator.cache.modify(|s| s.vaults.clear());
        let before = coordinator.snapshot();

        let err = coordinator
            .create_or_update(draft("GitHub", "pw"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Validation(_)));
        assert!(Arc::ptr_eq(&before, &coordinator.snapshot()));
    }

    #[tokio::test]
    async fn test_failed_create_rolls_back() {
        let (repo, coordinator) = setup().await;
        coordinator
            .create_or_update(draft("Existing", "pw"), None)
            .await
            .unwrap();
        let before = coordinator.snapshot();

        repo.set_offline(true);
        let err = coordinator
            .create_or_update(draft("GitHub", "pw"), None)
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::Repository(_)));
        assert_eq!(*coordinator.snapshot(), *before);
    }

    #[tokio::test]
    async fn test_optimistic_state_visible_to_subscribers() {
        let (_repo, coordinator) = setup().await;
        let mut rx = coordinator.subscribe();
        rx.borrow_and_update();

        coordinator
            .create_or_update(draft("GitHub", "pw"), None)
            .await
            .unwrap();

        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().entries.len(), 1);
    }

    #[tokio::test]
    async fn test_trash_then_restore_only_touches_timestamps() {
        let (_repo, coordinator) = setup().await;
        let id = coordinator
            .create_or_update(draft("GitHub", "pw"), None)
            .await
            .unwrap();
        let original = coordinator.snapshot().entry(&id).unwrap().clone();

        coordinator.trash(&id, false).await.unwrap();
        let trashed = coordinator.snapshot().entry(&id).unwrap().clone();
        assert!(trashed.is_trashed());
        assert!(trashed.updated_at >= original.updated_at);

        coordinator.restore(&id).await.unwrap();
        let mut restored = coordinator.snapshot().entry(&id).unwrap().clone();
        assert!(restored.deleted_at.is_none());
        assert!(restored.updated_at >= trashed.updated_at);

        restored.updated_at = original.updated_at;
        assert_eq!(restored, original);
    }

    #[tokio::test]
    async fn test_trash_unknown_entry_is_not_found() {
        let (_repo, coordinator) = setup().await;
        let ghost = EntryId::new("ghost");
        assert!(matches!(
            coordinator.trash(&ghost, true).await,
            Err(SyncError::NotFound(_))
        ));
        assert!(matches!(
            coordinator.trash(&ghost, false).await,
            Err(SyncError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_purge_removes_from_cache_and_store() {
        let (repo, coordinator) = setup().await;
        let id = coordinator
            .create_or_update(draft("GitHub", "pw"), None)
            .await
            .unwrap();
        let vault = coordinator.snapshot().entry(&id).unwrap().vault_id.clone();

        coordinator.trash(&id, false).await.unwrap();
        coordinator.trash(&id, true).await.unwrap();

        assert!(coordinator.snapshot().entry(&id).is_none());
        assert!(repo
            .list_entries(&UserId::new("alice"), &vault)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_failed_trash_rolls_back() {
        let (repo, coordinator) = setup().await;
        let id = coordinator
            .create_or_update(draft("GitHub", "pw"), None)
            .await
            .unwrap();
        let before = coordinator.snapshot();

        repo.set_offline(true);
        assert!(coordinator.trash(&id, false).await.is_err());
        assert!(coordinator.toggle_favorite(&id).await.is_err());
        assert_eq!(*coordinator.snapshot(), *before);
    }

    #[tokio::test]
    async fn test_toggle_favorite() {
        let (_repo, coordinator) = setup().await;
        let id = coordinator
            .create_or_update(draft("GitHub", "pw"), None)
            .await
            .unwrap();

        coordinator.toggle_favorite(&id).await.unwrap();
        assert!(coordinator.snapshot().entry(&id).unwrap().is_favorite);
        coordinator.toggle_favorite(&id).await.unwrap();
        assert!(!coordinator.snapshot().entry(&id).unwrap().is_favorite);
    }

    /// Fails writes to one entry, but only once a write to another entry
    /// has gone through.
    struct GatedRepository {
        inner: MemoryRepository,
        failing: parking_lot::Mutex<Option<EntryId>>,
        gate: tokio::sync::Notify,
    }

    #[async_trait::async_trait]
    impl VaultRepository for GatedRepository {
        async fn list_vaults(&self, user: &UserId) -> RepositoryResult<Vec<Vault>> {
            self.inner.list_vaults(user).await
        }

        async fn create_vault(&self, user: &UserId, name: &str) -> RepositoryResult<Vault> {
            self.inner.create_vault(user, name).await
        }

        async fn list_entries(
            &self,
            user: &UserId,
            vault: &VaultId,
        ) -> RepositoryResult<Vec<CredentialEntry>> {
            self.inner.list_entries(user, vault).await
        }

        async fn create_entry(
            &self,
            user: &UserId,
            vault: &VaultId,
            entry: CredentialEntry,
        ) -> RepositoryResult<EntryId> {
            self.inner.create_entry(user, vault, entry).await
        }

        async fn update_entry(
            &self,
            user: &UserId,
            vault: &VaultId,
            id: &EntryId,
            patch: &EntryPatch,
        ) -> RepositoryResult<()> {
            if self.failing.lock().as_ref() == Some(id) {
                self.gate.notified().await;
                return Err(RepositoryError::Transport("rejected".to_string()));
            }
            let result = self.inner.update_entry(user, vault, id, patch).await;
            self.gate.notify_one();
            result
        }

        async fn delete_entry(
            &self,
            user: &UserId,
            vault: &VaultId,
            id: &EntryId,
        ) -> RepositoryResult<()> {
            self.inner.delete_entry(user, vault, id).await
        }
    }

    #[tokio::test]
    async fn test_failed_mutation_keeps_concurrent_commit_of_other_entry() {
        let repo = Arc::new(GatedRepository {
            inner: MemoryRepository::new(),
            failing: parking_lot::Mutex::new(None),
            gate: tokio::sync::Notify::new(),
        });
        let coordinator = VaultCoordinator::new(repo.clone(), Cipher::with_key("test-key"));
        coordinator.init(Session::new("alice")).await.unwrap();
        let a = coordinator
            .create_or_update(draft("A", "pw-a"), None)
            .await
            .unwrap();
        let b = coordinator
            .create_or_update(draft("B", "pw-b"), None)
            .await
            .unwrap();
        let original_a = coordinator.snapshot().entry(&a).unwrap().clone();
        *repo.failing.lock() = Some(a.clone());

        let (ra, rb) = tokio::join!(coordinator.toggle_favorite(&a), coordinator.toggle_favorite(&b));
        assert!(ra.is_err());
        assert!(rb.is_ok());

        let snapshot = coordinator.snapshot();
        assert_eq!(snapshot.entry(&a).unwrap(), &original_a);
        let cached_b = snapshot.entry(&b).unwrap();
        assert!(cached_b.is_favorite);

        let stored = repo
            .inner
            .list_entries(&UserId::new("alice"), &cached_b.vault_id)
            .await
            .unwrap();
        assert_eq!(stored.iter().find(|e| e.id == b), Some(cached_b));
    }

    #[tokio::test]
    async fn test_update_records_history_only_on_change() {
        let (_repo, coordinator) = setup().await;
        let id = coordinator
            .create_or_update(draft("GitHub", "first"), None)
            .await
            .unwrap();
        let first_ct = coordinator.snapshot().entry(&id).unwrap().secret.clone();

        coordinator
            .create_or_update(draft("GitHub (work)", "first"), Some(&id))
            .await
            .unwrap();
        let entry = coordinator.snapshot().entry(&id).unwrap().clone();
        assert_eq!(entry.service_name, "GitHub (work)");
        assert_eq!(entry.secret, first_ct);
        assert!(entry.secret_history.is_empty());

        coordinator
            .create_or_update(draft("GitHub (work)", "second"), Some(&id))
            .await
            .unwrap();
        let entry = coordinator.snapshot().entry(&id).unwrap().clone();
        assert_eq!(entry.secret_history.len(), 1);
        assert_eq!(entry.secret_history[0].secret, first_ct);
        assert_eq!(coordinator.reveal(&id).unwrap().expose(), "second");
    }

    #[tokio::test]
    async fn test_update_cannot_move_vaults() {
        let (_repo, coordinator) = setup().await;
        let id = coordinator
            .create_or_update(draft("GitHub", "pw"), None)
            .await
            .unwrap();
        let other = coordinator.add_vault("Work").await.unwrap();

        let err = coordinator
            .create_or_update(draft("GitHub", "pw").in_vault(other.id), Some(&id))
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Validation(_)));
    }

    #[tokio::test]
    async fn test_add_vault_refreshes_with_store_id() {
        let (_repo, coordinator) = setup().await;
        let vault = coordinator.add_vault("  Work ").await.unwrap();

        let snapshot = coordinator.snapshot();
        assert_eq!(snapshot.vaults.len(), 2);
        assert_eq!(snapshot.vault(&vault.id).unwrap().name, "Work");
    }

    #[tokio::test]
    async fn test_selected_vault_is_creation_target() {
        let (_repo, coordinator) = setup().await;
        let work = coordinator.add_vault("Work").await.unwrap();
        coordinator.select_vault(Some(work.id.clone())).unwrap();

        let id = coordinator
            .create_or_update(draft("Jira", "pw"), None)
            .await
            .unwrap();
        assert_eq!(coordinator.snapshot().entry(&id).unwrap().vault_id, work.id);

        assert!(matches!(
            coordinator.select_vault(Some(VaultId::new("nope"))),
            Err(SyncError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_duplicates_across_vaults() {
        let (_repo, coordinator) = setup().await;
        let work = coordinator.add_vault("Work").await.unwrap();
        let a = coordinator
            .create_or_update(draft("A", "password123"), None)
            .await
            .unwrap();
        coordinator
            .create_or_update(draft("B", "password123").in_vault(work.id), None)
            .await
            .unwrap();

        let snapshot = coordinator.snapshot();
        let report = analytics::detect_duplicates(
            &snapshot.entries,
            coordinator.cipher(),
            "password123",
            Some(&a),
        );
        assert_eq!(report.count, 1);
    }

    #[tokio::test]
    async fn test_import_reports_failures() {
        let (_repo, coordinator) = setup().await;
        let drafts = vec![
            draft("GitHub", "pw"),
            EntryDraft::new("Broken", "me", SecretString::default()),
        ];

        let report = coordinator.import(drafts, None).await.unwrap();
        assert_eq!(report.created.len(), 1);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].service_name, "Broken");
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_cache() {
        let (repo, coordinator) = setup().await;
        coordinator
            .create_or_update(draft("GitHub", "pw"), None)
            .await
            .unwrap();
        let before = coordinator.snapshot();

        repo.set_offline(true);
        assert!(coordinator.refresh().await.is_err());
        assert!(Arc::ptr_eq(&before, &coordinator.snapshot()));
    }

    #[tokio::test]
    async fn test_dispose_clears_everything() {
        let (_repo, coordinator) = setup().await;
        coordinator
            .create_or_update(draft("GitHub", "pw"), None)
            .await
            .unwrap();

        coordinator.dispose();
        assert!(coordinator.session().is_none());
        assert_eq!(*coordinator.snapshot(), CacheState::default());
        assert!(matches!(
            coordinator.refresh().await,
            Err(SyncError::NoSession)
        ));
    }

    #[tokio::test]
    async fn test_init_failure_leaves_no_session() {
        let repo = Arc::new(MemoryRepository::new());
        repo.set_offline(true);
        let coordinator = VaultCoordinator::new(repo, Cipher::insecure());

        assert!(coordinator.init(Session::new("alice")).await.is_err());
        assert!(coordinator.session().is_none());
    }
}
