//! Configuration loading and persistence.

use super::{Config, LogLevel};
use crate::env::{self, vars};
use crate::error::ConfigError;
use crate::paths;
use crate::secret::SecretString;
use std::fs;
use std::path::{Path, PathBuf};

/// Argon2 rejects memory costs below 8 KiB per lane.
const MIN_ARGON2_MEMORY_KIB_PER_LANE: u32 = 8;

impl Config {
    /// Load configuration from the default path.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = paths::config_file()?;
        Self::load(&path)
    }

    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        json5::from_str(content).map_err(|e| ConfigError::Json5(e.to_string()))
    }

    /// Save configuration to the default path.
    pub fn save_default(&self) -> Result<(), ConfigError> {
        let path = paths::config_file()?;
        self.save(&path)
    }

    /// Save configuration to a file path.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_json5()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write atomically
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, path)?;

        Ok(())
    }

    /// Serialize to JSON5 string.
    pub fn to_json5(&self) -> Result<String, ConfigError> {
        // json5 has no serializer; plain JSON is valid JSON5.
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Validate the configuration, collecting all errors before returning.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.encryption.key_env.trim().is_empty() {
            errors.push("encryption.key_env must not be empty".to_string());
        }
        if let Some(key) = &self.encryption.key {
            if key.is_blank() {
                errors.push("encryption.key is set but blank".to_string());
            }
        }

        if !crate::id::is_valid_id(&self.session.user_id) {
            errors.push(format!(
                "session.user_id '{}' is not a valid identifier",
                self.session.user_id
            ));
        }
        if self.session.default_vault_name.trim().is_empty() {
            errors.push("session.default_vault_name must not be empty".to_string());
        }

        if self.export.iterations == 0 {
            errors.push("export.iterations must be greater than 0".to_string());
        }
        if self.export.parallelism == 0 {
            errors.push("export.parallelism must be greater than 0".to_string());
        }
        if self.export.memory_kib < MIN_ARGON2_MEMORY_KIB_PER_LANE * self.export.parallelism.max(1)
        {
            errors.push(format!(
                "export.memory_kib must be at least {} KiB per lane",
                MIN_ARGON2_MEMORY_KIB_PER_LANE
            ));
        }
        if self.export.min_passphrase_len == 0 {
            errors.push("export.min_passphrase_len must be greater than 0".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors.join("; ")))
        }
    }

    /// Load configuration from the default path, falling back to defaults if
    /// no file exists. Environment overrides are applied either way.
    pub fn load_or_default() -> Self {
        let mut config = match Self::load_default() {
            Ok(config) => config,
            Err(ConfigError::NotFound(_)) => Self::default(),
            Err(e) => {
                tracing::warn!("ignoring unreadable config file: {e}");
                Self::default()
            }
        };
        config.apply_env_overrides();
        config
    }

    /// Honor `CIPHER_VAULT_USER` and `CIPHER_VAULT_DATA_DIR`.
    pub fn apply_env_overrides(&mut self) {
        if let Some(user) = env::get_var(vars::USER) {
            self.session.user_id = user;
        }
        if let Some(dir) = env::get_var(vars::DATA_DIR) {
            self.storage.data_dir = Some(paths::expand_tilde(&dir));
        }
    }

    /// Resolve the cipher key: inline key first, then the configured
    /// environment variable.
    pub fn resolve_encryption_key(&self) -> Option<SecretString> {
        if let Some(key) = &self.encryption.key {
            if !key.is_blank() {
                return Some(key.clone());
            }
        }
        env::get_var(&self.encryption.key_env).map(SecretString::new)
    }

    /// Directory of the local document store.
    pub fn data_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.storage.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => paths::data_dir(),
        }
    }

    /// Directory export files are written to.
    pub fn export_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.export.output_dir {
            Some(dir) => Ok(dir.clone()),
            None => paths::exports_dir(),
        }
    }
}

/// Configuration builder for creating configs programmatically.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new config builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an inline cipher key.
    pub fn encryption_key(mut self, key: impl Into<SecretString>) -> Self {
        self.config.encryption.key = Some(key.into());
        self
    }

    /// Set the document store directory.
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.storage.data_dir = Some(dir.into());
        self
    }

    /// Set the session user.
    pub fn user(mut self, user_id: impl Into<String>) -> Self {
        self.config.session.user_id = user_id.into();
        self
    }

    /// Set the Argon2id cost parameters used for exports.
    pub fn export_kdf(mut self, memory_kib: u32, iterations: u32, parallelism: u32) -> Self {
        self.config.export.memory_kib = memory_kib;
        self.config.export.iterations = iterations;
        self.config.export.parallelism = parallelism;
        self
    }

    /// Set the log level.
    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.config.logging.level = level;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> Config {
        self.config
    }

    /// Build and validate the configuration.
    pub fn build_validated(self) -> Result<Config, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
