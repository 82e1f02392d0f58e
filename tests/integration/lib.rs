//! Fixtures shared by the integration tests.

use std::path::Path;
use std::sync::Arc;

use cipher_vault_core::config::ConfigBuilder;
use cipher_vault_core::Config;
use cipher_vault_crypto::Cipher;
use cipher_vault_sync::{FileRepository, Session, VaultCoordinator};

pub const TEST_KEY: &str = "integration-test-key";
pub const TEST_USER: &str = "integration";

/// A config rooted in `dir` with a fixed key and cheap export stretching.
pub fn config_in(dir: &Path) -> Config {
    ConfigBuilder::new()
        .user(TEST_USER)
        .encryption_key(TEST_KEY)
        .data_dir(dir.join("data"))
        .export_kdf(1024, 1, 1)
        .build()
}

/// A coordinator over the file store in `dir`, with an initialized session.
pub async fn open_coordinator(dir: &Path, key: &str) -> VaultCoordinator {
    let repo = Arc::new(FileRepository::new(dir.join("data")));
    let coordinator = VaultCoordinator::new(repo, Cipher::with_key(key));
    coordinator
        .init(Session::new(TEST_USER))
        .await
        .expect("session init");
    coordinator
}
