//! Config save/load roundtrip integration tests.

use cipher_vault_core::config::{ConfigBuilder, LogLevel};
use cipher_vault_core::Config;
use cipher_vault_crypto::{KeyProvider, StaticKeyProvider};
use std::path::Path;
use tempfile::TempDir;

#[test]
fn test_config_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cipher-vault.json5");

    let config = Config::default();
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.session.user_id, config.session.user_id);
    assert_eq!(loaded.session.default_vault_name, config.session.default_vault_name);
    assert_eq!(loaded.encryption.key_env, config.encryption.key_env);
    assert_eq!(loaded.export.memory_kib, config.export.memory_kib);
    assert!(loaded.encryption.key.is_none());
}

#[test]
fn test_config_modify_and_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cipher-vault.json5");

    let config = ConfigBuilder::new()
        .user("dana")
        .encryption_key("inline-key")
        .export_kdf(2048, 3, 1)
        .log_level(LogLevel::Warn)
        .build();
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.session.user_id, "dana");
    assert_eq!(loaded.export.iterations, 3);
    assert_eq!(loaded.logging.level, LogLevel::Warn);

    let provider = StaticKeyProvider::from_config(&loaded);
    assert_eq!(provider.current_key().unwrap().expose_secret(), "inline-key");
}

#[test]
fn test_config_accepts_json5() {
    let config = Config::parse(
        r#"{
            // trailing commas and comments
            session: { user_id: 'erin', default_vault_name: 'Main', },
            export: { min_passphrase_len: 12 },
        }"#,
    )
    .unwrap();
    assert_eq!(config.session.default_vault_name, "Main");
    assert_eq!(config.export.min_passphrase_len, 12);
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_load_nonexistent() {
    let result = Config::load(Path::new("/nonexistent/cipher-vault.json5"));
    assert!(result.is_err());
}

#[test]
fn test_config_parse_invalid() {
    assert!(Config::parse("not valid json").is_err());
}
