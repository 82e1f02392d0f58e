//! Configuration loading and the engine handles shared by every command.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;
use cipher_vault_core::{Config, ConfigError, UserId, VaultId};
use cipher_vault_crypto::{Cipher, StaticKeyProvider};
use cipher_vault_sync::{
    CacheState, FileRepository, Session, TokenRepository, TokenService, VaultCoordinator,
    VaultRepository,
};
use tracing::debug;

/// Load the configuration from `path`, or from the default location.
///
/// A missing file yields the defaults. Environment overrides are applied and
/// the result validated either way.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => {
            let mut config = match Config::load(path) {
                Ok(config) => config,
                Err(ConfigError::NotFound(_)) => {
                    debug!(path = %path.display(), "config file not found, using defaults");
                    Config::default()
                }
                Err(e) => return Err(e).context(format!("loading {}", path.display())),
            };
            config.apply_env_overrides();
            config
        }
        None => Config::load_or_default(),
    };
    config.validate()?;
    Ok(config)
}

/// An open vault session for the configured user.
pub struct Context {
    pub config: Config,
    pub user: UserId,
    pub coordinator: VaultCoordinator,
    pub tokens: TokenService,
}

impl Context {
    /// Open the local document store named by the configuration.
    pub async fn open(config: Config) -> anyhow::Result<Self> {
        let repo = Arc::new(FileRepository::from_config(&config)?);
        debug!(dir = %repo.dir().display(), "using file repository");
        Self::with_repository(config, repo).await
    }

    /// Open a session over any store implementing both contracts.
    pub async fn with_repository<R>(config: Config, repo: Arc<R>) -> anyhow::Result<Self>
    where
        R: VaultRepository + TokenRepository + 'static,
    {
        let cipher = Cipher::new(Arc::new(StaticKeyProvider::from_config(&config)));
        let session = Session::from_config(&config);
        let user = session.user_id.clone();

        let coordinator = VaultCoordinator::new(repo.clone(), cipher.clone());
        coordinator
            .init(session)
            .await
            .with_context(|| format!("opening vaults of user '{user}'"))?;
        let tokens = TokenService::new(repo, cipher);

        Ok(Self {
            config,
            user,
            coordinator,
            tokens,
        })
    }

    pub fn cipher(&self) -> &Cipher {
        self.coordinator.cipher()
    }

    pub fn snapshot(&self) -> Arc<CacheState> {
        self.coordinator.snapshot()
    }

    /// Find a vault by id, or by case-insensitive name.
    pub fn resolve_vault(&self, key: &str) -> anyhow::Result<VaultId> {
        resolve_vault(&self.snapshot(), key)
    }
}

pub(crate) fn resolve_vault(state: &CacheState, key: &str) -> anyhow::Result<VaultId> {
    let key = key.trim();
    state
        .vaults
        .iter()
        .find(|v| v.id.as_str() == key)
        .or_else(|| state.vaults.iter().find(|v| v.name.eq_ignore_ascii_case(key)))
        .map(|v| v.id.clone())
        .ok_or_else(|| anyhow::anyhow!("No vault named '{key}'"))
}

/// Read a secret from `value`, or prompt for it without echo.
pub fn secret_or_prompt(value: Option<String>, prompt: &str) -> anyhow::Result<String> {
    match value {
        Some(v) => Ok(v),
        None => rpassword::prompt_password(prompt).context("reading hidden input"),
    }
}
