//! End-to-end flows over the file-backed store, across process restarts.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDate;
use cipher_vault_core::{EntryDraft, SecretString, UserId};
use cipher_vault_crypto::{passphrase, Cipher};
use cipher_vault_integration_tests::{open_coordinator, TEST_KEY, TEST_USER};
use cipher_vault_sync::analytics::detect_duplicates;
use cipher_vault_sync::export::export_scope;
use cipher_vault_sync::import::{self, ImportFormat};
use cipher_vault_sync::{
    ExportFormat, ExportOptions, ExportScope, FileRepository, TokenService, VaultRepository,
};
use tempfile::TempDir;

#[tokio::test]
async fn test_entries_survive_reload() {
    let dir = TempDir::new().unwrap();

    let id = {
        let coordinator = open_coordinator(dir.path(), TEST_KEY).await;
        let id = coordinator
            .create_or_update(
                EntryDraft::new("GitHub", "octo", "first-secret")
                    .with_url("https://github.com")
                    .with_tag("dev"),
                None,
            )
            .await
            .unwrap();
        coordinator
            .create_or_update(EntryDraft::new("GitHub", "octo", "second-secret"), Some(&id))
            .await
            .unwrap();
        coordinator.toggle_favorite(&id).await.unwrap();
        coordinator.dispose();
        id
    };

    let coordinator = open_coordinator(dir.path(), TEST_KEY).await;
    let snapshot = coordinator.snapshot();
    assert_eq!(snapshot.vaults.len(), 1, "default vault is created only once");

    let entry = snapshot.entry(&id).unwrap();
    assert!(entry.is_favorite);
    assert_eq!(entry.secret_history.len(), 1);
    assert_eq!(coordinator.reveal(&id).unwrap().expose(), "second-secret");
    assert_eq!(
        coordinator.cipher().decrypt(&entry.secret_history[0].secret),
        "first-secret"
    );
}

#[tokio::test]
async fn test_stored_document_holds_no_plaintext() {
    let dir = TempDir::new().unwrap();
    let coordinator = open_coordinator(dir.path(), TEST_KEY).await;
    coordinator
        .create_or_update(EntryDraft::new("Bank", "me", "very-private-pin"), None)
        .await
        .unwrap();

    let repo = FileRepository::new(dir.path().join("data"));
    let path = repo.document_path(&UserId::new(TEST_USER)).unwrap();
    let raw = std::fs::read_to_string(path).unwrap();
    assert!(raw.contains("Bank"));
    assert!(!raw.contains("very-private-pin"));
}

#[tokio::test]
async fn test_wrong_key_reads_ciphertext_back() {
    let dir = TempDir::new().unwrap();
    let id = {
        let coordinator = open_coordinator(dir.path(), TEST_KEY).await;
        coordinator
            .create_or_update(EntryDraft::new("Mail", "me", "mail-secret"), None)
            .await
            .unwrap()
    };

    let coordinator = open_coordinator(dir.path(), "a-different-key").await;
    let stored = coordinator.snapshot().entry(&id).unwrap().secret.clone();
    assert_eq!(coordinator.reveal(&id).unwrap().expose(), stored);
}

#[tokio::test]
async fn test_trash_restore_and_purge_persist() {
    let dir = TempDir::new().unwrap();
    let (kept, purged) = {
        let coordinator = open_coordinator(dir.path(), TEST_KEY).await;
        let kept = coordinator
            .create_or_update(EntryDraft::new("Kept", "me", "pw-one"), None)
            .await
            .unwrap();
        let purged = coordinator
            .create_or_update(EntryDraft::new("Gone", "me", "pw-two"), None)
            .await
            .unwrap();
        coordinator.trash(&kept, false).await.unwrap();
        coordinator.trash(&purged, false).await.unwrap();
        coordinator.trash(&purged, true).await.unwrap();
        (kept, purged)
    };

    let coordinator = open_coordinator(dir.path(), TEST_KEY).await;
    let snapshot = coordinator.snapshot();
    assert!(snapshot.entry(&kept).unwrap().is_trashed());
    assert!(snapshot.entry(&purged).is_none());

    coordinator.restore(&kept).await.unwrap();
    let coordinator = open_coordinator(dir.path(), TEST_KEY).await;
    assert!(coordinator.snapshot().entry(&kept).unwrap().is_active());
}

#[tokio::test]
async fn test_duplicates_span_vaults() {
    let dir = TempDir::new().unwrap();
    let coordinator = open_coordinator(dir.path(), TEST_KEY).await;
    let work = coordinator.add_vault("Work").await.unwrap();

    coordinator
        .create_or_update(EntryDraft::new("A", "me", "password123"), None)
        .await
        .unwrap();
    coordinator
        .create_or_update(EntryDraft::new("B", "me", "password123").in_vault(work.id), None)
        .await
        .unwrap();

    let snapshot = coordinator.snapshot();
    let report = detect_duplicates(&snapshot.entries, coordinator.cipher(), "password123", None);
    assert_eq!(report.count, 2);
}

#[tokio::test]
async fn test_import_then_export_selected() {
    let dir = TempDir::new().unwrap();
    let coordinator = open_coordinator(dir.path(), TEST_KEY).await;

    let csv = "title,login,password,notes\n\
               Forum,me,forum-pw,\"line, with comma\"\n\
               Shop,me,shop-pw,\n";
    let drafts = import::parse(csv, ImportFormat::Csv).unwrap();
    let report = coordinator.import(drafts, None).await.unwrap();
    assert_eq!(report.created.len(), 2);
    assert!(report.failed.is_empty());

    let selected: BTreeSet<_> = report.created.iter().take(1).cloned().collect();
    let snapshot = coordinator.snapshot();
    let export = export_scope(
        &snapshot.entries,
        &snapshot.vaults,
        coordinator.cipher(),
        &ExportScope::SelectedIds(selected),
        ExportFormat::Json,
        &SecretString::new("export passphrase"),
        &ExportOptions {
            kdf: passphrase::KdfParams {
                memory_kib: 1024,
                iterations: 1,
                parallelism: 1,
            },
            min_passphrase_len: 8,
        },
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
    )
    .unwrap();
    assert_eq!(export.file_name, "cipher-vault-export-2024-03-09.json.enc");
    assert_eq!(export.record_count, 1);

    let out = TempDir::new().unwrap();
    let path = export.write_to(out.path()).await.unwrap();
    let sealed = std::fs::read_to_string(path).unwrap();
    let kdf = passphrase::KdfParams {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    };
    let plain = passphrase::open(&sealed, "export passphrase", &kdf).unwrap();
    let records: serde_json::Value = serde_json::from_slice(&plain).unwrap();
    assert_eq!(records.as_array().unwrap().len(), 1);
    assert_eq!(records[0]["serviceName"], "Forum");
    assert_eq!(records[0]["password"], "forum-pw");
    assert_eq!(records[0]["folder"], "Personal");

    assert!(passphrase::open(&sealed, "wrong passphrase", &kdf).is_err());
}

#[tokio::test]
async fn test_tokens_persist_encrypted() {
    let dir = TempDir::new().unwrap();
    let user = UserId::new(TEST_USER);
    let repo = Arc::new(FileRepository::new(dir.path().join("data")));
    let service = TokenService::new(repo.clone(), Cipher::with_key(TEST_KEY));

    service
        .add_or_update(&user, "deploy", &SecretString::new("tok-123"), None)
        .await
        .unwrap();

    let reopened = TokenService::new(repo.clone(), Cipher::with_key(TEST_KEY));
    let token = reopened.find(&user, "deploy").await.unwrap();
    assert_ne!(token.value, "tok-123");
    assert_eq!(reopened.reveal(&token).expose(), "tok-123");

    // Tokens and vaults share one document.
    assert!(repo.list_vaults(&user).await.unwrap().is_empty());
}
