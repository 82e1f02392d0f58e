//! Configuration management commands.

use std::path::{Path, PathBuf};

use clap::Args;
use cipher_vault_core::{paths, Config};

/// Config command arguments.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(clap::Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration (inline key redacted)
    Show,

    /// Get a configuration value
    Get {
        /// Configuration key (dot-separated path)
        key: String,
    },

    /// Write a configuration file with the defaults
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Show configuration file path
    Path,

    /// Validate the configuration
    Validate,
}

/// The configuration as JSON, with any inline key replaced.
pub fn redacted_json(config: &Config) -> anyhow::Result<serde_json::Value> {
    let mut json = serde_json::to_value(config)?;
    if let Some(key) = json.pointer_mut("/encryption/key") {
        *key = serde_json::Value::String("[REDACTED]".to_string());
    }
    Ok(json)
}

fn lookup<'a>(json: &'a serde_json::Value, key: &str) -> Option<&'a serde_json::Value> {
    key.split('.').try_fold(json, |acc, k| acc.get(k))
}

fn config_path(explicit: Option<&Path>) -> anyhow::Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(paths::config_file()?),
    }
}

/// Run the config command against the already loaded `config`.
pub fn run(args: ConfigArgs, config: &Config, explicit: Option<&Path>) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => {
            println!("{}", serde_json::to_string_pretty(&redacted_json(config)?)?);
        }

        ConfigCommand::Get { key } => {
            let json = redacted_json(config)?;
            match lookup(&json, &key) {
                Some(v) => println!("{}", serde_json::to_string_pretty(v)?),
                None => anyhow::bail!("Key not found: {}", key),
            }
        }

        ConfigCommand::Init { force } => {
            let path = config_path(explicit)?;
            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists: {}. Use --force to overwrite.",
                    path.display()
                );
            }
            if explicit.is_none() {
                paths::ensure_dirs()?;
            }
            Config::default().save(&path)?;
            println!("Created config file: {}", path.display());
            println!(
                "  Set {} to encrypt stored passwords.",
                Config::default().encryption.key_env
            );
        }

        ConfigCommand::Path => {
            println!("{}", config_path(explicit)?.display());
        }

        ConfigCommand::Validate => {
            config.validate()?;
            println!("Configuration is valid");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cipher_vault_core::config::ConfigBuilder;
    use tempfile::TempDir;

    #[test]
    fn test_show_redacts_inline_key() {
        let config = ConfigBuilder::new().encryption_key("top-secret").build();
        let json = redacted_json(&config).unwrap();
        assert_eq!(json["encryption"]["key"], "[REDACTED]");
        assert!(!json.to_string().contains("top-secret"));
    }

    #[test]
    fn test_dot_path_get() {
        let json = redacted_json(&Config::default()).unwrap();
        let value = lookup(&json, "session.default_vault_name").unwrap();
        assert_eq!(value, "Personal");
        assert!(lookup(&json, "session.nope").is_none());
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cipher-vault.json5");
        let init = |force| ConfigArgs {
            command: ConfigCommand::Init { force },
        };

        run(init(false), &Config::default(), Some(&path)).unwrap();
        assert!(Config::load(&path).is_ok());
        assert!(run(init(false), &Config::default(), Some(&path)).is_err());
        assert!(run(init(true), &Config::default(), Some(&path)).is_ok());
    }
}
