//! CLI commands run against a file-backed store in a temporary directory.

use cipher_vault_cli::commands::entry::{EntryArgs, EntryCommand, EntryFields};
use cipher_vault_cli::commands::vault::{VaultArgs, VaultCommand};
use cipher_vault_cli::commands::{entry, vault};
use cipher_vault_cli::context::Context;
use cipher_vault_integration_tests::config_in;
use tempfile::TempDir;

#[tokio::test]
async fn test_cli_session_round_trip() {
    let dir = TempDir::new().unwrap();

    {
        let ctx = Context::open(config_in(dir.path())).await.unwrap();
        vault::run(
            VaultArgs {
                command: VaultCommand::Add {
                    name: "Work".to_string(),
                },
            },
            &ctx,
        )
        .await
        .unwrap();

        entry::run(
            EntryArgs {
                command: EntryCommand::Add {
                    service: "Jira".to_string(),
                    fields: EntryFields {
                        username: Some("me".to_string()),
                        password: Some("jira-secret".to_string()),
                        vault: Some("work".to_string()),
                        ..EntryFields::default()
                    },
                },
            },
            &ctx,
        )
        .await
        .unwrap();
    }

    let ctx = Context::open(config_in(dir.path())).await.unwrap();
    let snapshot = ctx.snapshot();
    assert_eq!(snapshot.vaults.len(), 2);

    let work = ctx.resolve_vault("Work").unwrap();
    let entry = &snapshot.entries[0];
    assert_eq!(entry.vault_id, work);
    assert_eq!(ctx.coordinator.reveal(&entry.id).unwrap().expose(), "jira-secret");
}
