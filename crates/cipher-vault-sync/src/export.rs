//! Encrypted export of a scoped set of entries.
//!
//! The payload is rendered as CSV or pretty JSON with secrets decrypted, then
//! sealed under a user passphrase that is independent of the vault key and
//! never stored.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use cipher_vault_core::config::ExportConfig;
use cipher_vault_core::{CredentialEntry, EntryId, SecretString, Vault, VaultId};
use cipher_vault_crypto::{passphrase, Cipher, KdfParams};
use serde::Serialize;
use tracing::info;

use crate::error::SyncError;
use crate::history;
use crate::Result;

/// Header row of the CSV format.
pub const CSV_HEADER: &str =
    "serviceName,url,username,password,notes,folder,tags,isFavorite,createdAt,updatedAt";

/// Separator between tags inside the CSV `tags` column.
pub const TAG_SEPARATOR: &str = "|";

/// Which entries to export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportScope {
    /// Every active entry, regardless of any filter.
    All,
    /// The caller's already filtered and sorted list, as given.
    CurrentView(Vec<CredentialEntry>),
    /// Entries with these ids, active or trashed.
    SelectedIds(BTreeSet<EntryId>),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(SyncError::Export(format!("unsupported format: {other}"))),
        }
    }
}

/// Passphrase policy and key stretching cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    pub kdf: KdfParams,
    pub min_passphrase_len: usize,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            kdf: KdfParams::default(),
            min_passphrase_len: 8,
        }
    }
}

impl From<&ExportConfig> for ExportOptions {
    fn from(config: &ExportConfig) -> Self {
        Self {
            kdf: KdfParams::from(config),
            min_passphrase_len: config.min_passphrase_len,
        }
    }
}

/// One exported entry, secret in clear.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRecord {
    pub id: EntryId,
    pub vault_id: VaultId,
    pub service_name: String,
    pub url: Option<String>,
    pub username: String,
    pub password: String,
    pub notes: Option<String>,
    pub folder: String,
    pub tags: Vec<String>,
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    /// Prior secrets in clear, newest first. Only the JSON format carries them.
    pub secret_history: Vec<ExportedHistoryItem>,
}

/// A prior secret of an exported entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportedHistoryItem {
    pub secret: String,
    pub timestamp: DateTime<Utc>,
}

/// A sealed export ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedExport {
    pub file_name: String,
    pub contents: String,
    pub record_count: usize,
    pub format: ExportFormat,
}

impl EncryptedExport {
    /// Write the export into `dir` (created if missing) with mode 0600 on Unix.
    pub async fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let io = |e: std::io::Error| SyncError::Export(format!("writing export: {e}"));

        tokio::fs::create_dir_all(dir).await.map_err(io)?;
        let path = dir.join(&self.file_name);
        tokio::fs::write(&path, &self.contents).await.map_err(io)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            tokio::fs::set_permissions(&path, perms).await.map_err(io)?;
        }

        Ok(path)
    }
}

/// Name of an export file produced on `date`.
pub fn file_name(date: NaiveDate, format: ExportFormat) -> String {
    format!(
        "cipher-vault-export-{}.{}.enc",
        date.format("%Y-%m-%d"),
        format.extension()
    )
}

/// Resolve a scope against the full entry list.
pub fn select_scope(entries: &[CredentialEntry], scope: &ExportScope) -> Vec<CredentialEntry> {
    match scope {
        ExportScope::All => entries.iter().filter(|e| e.is_active()).cloned().collect(),
        ExportScope::CurrentView(view) => view.clone(),
        ExportScope::SelectedIds(ids) => entries
            .iter()
            .filter(|e| ids.contains(&e.id))
            .cloned()
            .collect(),
    }
}

/// Decrypt entries into export records. `folder` is the vault name.
pub fn records(entries: &[CredentialEntry], vaults: &[Vault], cipher: &Cipher) -> Vec<ExportRecord> {
    entries
        .iter()
        .map(|e| ExportRecord {
            id: e.id.clone(),
            vault_id: e.vault_id.clone(),
            service_name: e.service_name.clone(),
            url: e.url.clone(),
            username: e.username.clone(),
            password: cipher.decrypt(&e.secret),
            notes: e.notes.clone(),
            folder: vaults
                .iter()
                .find(|v| v.id == e.vault_id)
                .map(|v| v.name.clone())
                .unwrap_or_default(),
            tags: e.tags.iter().cloned().collect(),
            is_favorite: e.is_favorite,
            created_at: e.created_at,
            updated_at: e.updated_at,
            deleted_at: e.deleted_at,
            secret_history: history::reveal_history(&e.secret_history, cipher)
                .into_iter()
                .map(|(timestamp, secret)| ExportedHistoryItem {
                    secret: secret.expose().to_string(),
                    timestamp,
                })
                .collect(),
        })
        .collect()
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn iso(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Render records as CSV: fixed header, every field quoted.
pub fn render_csv(records: &[ExportRecord]) -> String {
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(CSV_HEADER.to_string());
    for r in records {
        let fields = [
            r.service_name.clone(),
            r.url.clone().unwrap_or_default(),
            r.username.clone(),
            r.password.clone(),
            r.notes.clone().unwrap_or_default(),
            r.folder.clone(),
            r.tags.join(TAG_SEPARATOR),
            r.is_favorite.to_string(),
            iso(&r.created_at),
            iso(&r.updated_at),
        ];
        lines.push(fields.iter().map(|f| quote(f)).collect::<Vec<_>>().join(","));
    }
    lines.join("\n")
}

/// Render records as a pretty JSON array.
pub fn render_json(records: &[ExportRecord]) -> Result<String> {
    serde_json::to_string_pretty(records)
        .map_err(|e| SyncError::Export(format!("serializing export: {e}")))
}

/// Select, render and seal entries for export.
#[allow(clippy::too_many_arguments)]
pub fn export_scope(
    entries: &[CredentialEntry],
    vaults: &[Vault],
    cipher: &Cipher,
    scope: &ExportScope,
    format: ExportFormat,
    passphrase: &SecretString,
    options: &ExportOptions,
    date: NaiveDate,
) -> Result<EncryptedExport> {
    if passphrase.char_count() < options.min_passphrase_len {
        return Err(SyncError::Export(format!(
            "passphrase must be at least {} characters long",
            options.min_passphrase_len
        )));
    }

    let selected = select_scope(entries, scope);
    if selected.is_empty() {
        return Err(SyncError::Export(
            "the selected scope contains no entries".to_string(),
        ));
    }

    let records = records(&selected, vaults, cipher);
    let payload = match format {
        ExportFormat::Csv => render_csv(&records),
        ExportFormat::Json => render_json(&records)?,
    };
    let contents = passphrase::seal(payload.as_bytes(), passphrase.expose_secret(), &options.kdf)?;

    info!(records = records.len(), format = %format, "export sealed");
    Ok(EncryptedExport {
        file_name: file_name(date, format),
        contents,
        record_count: records.len(),
        format,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAST: ExportOptions = ExportOptions {
        kdf: KdfParams {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        },
        min_passphrase_len: 8,
    };

    fn entry(cipher: &Cipher, id: &str, secret: &str) -> CredentialEntry {
        let at = DateTime::parse_from_rfc3339("2024-03-01T10:20:30.456Z")
            .unwrap()
            .with_timezone(&Utc);
        CredentialEntry {
            id: EntryId::new(id),
            vault_id: VaultId::new("v1"),
            service_name: format!("svc-{id}"),
            url: None,
            username: "me".to_string(),
            secret: cipher.encrypt(secret).unwrap(),
            notes: None,
            tags: Default::default(),
            is_favorite: false,
            created_at: at,
            updated_at: at,
            deleted_at: None,
            secret_history: Vec::new(),
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    fn open(export: &EncryptedExport, pass: &str) -> String {
        let bytes = passphrase::open(&export.contents, pass, &FAST.kdf).unwrap();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_selected_ids_exports_exactly_those() {
        let cipher = Cipher::with_key("k");
        let mut entries: Vec<_> = (0..5).map(|i| entry(&cipher, &format!("e{i}"), "pw")).collect();
        let changed_at = Utc::now();
        entries[0].push_history(cipher.encrypt("old-pw").unwrap(), changed_at);
        let ids: BTreeSet<EntryId> = ["e0", "e2", "e4"].into_iter().map(EntryId::new).collect();

        let export = export_scope(
            &entries,
            &[],
            &cipher,
            &ExportScope::SelectedIds(ids),
            ExportFormat::Json,
            &SecretString::new("long enough"),
            &FAST,
            date(),
        )
        .unwrap();

        assert_eq!(export.record_count, 3);
        let json: serde_json::Value = serde_json::from_str(&open(&export, "long enough")).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 3);
        assert_eq!(json[0]["password"], "pw");

        let history = json[0]["secretHistory"].as_array().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0]["secret"], "old-pw");
        let stamped: DateTime<Utc> =
            serde_json::from_value(history[0]["timestamp"].clone()).unwrap();
        assert_eq!(stamped, changed_at);
        assert!(json[1]["secretHistory"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_empty_scope_is_an_error() {
        let cipher = Cipher::insecure();
        let mut trashed = entry(&cipher, "e1", "pw");
        trashed.deleted_at = Some(Utc::now());

        let err = export_scope(
            &[trashed],
            &[],
            &cipher,
            &ExportScope::All,
            ExportFormat::Csv,
            &SecretString::new("long enough"),
            &FAST,
            date(),
        )
        .unwrap_err();
        assert!(matches!(err, SyncError::Export(_)));
    }

    #[test]
    fn test_short_passphrase_rejected() {
        let cipher = Cipher::insecure();
        let err = export_scope(
            &[entry(&cipher, "e1", "pw")],
            &[],
            &cipher,
            &ExportScope::All,
            ExportFormat::Csv,
            &SecretString::new("short"),
            &FAST,
            date(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("at least 8"));
    }

    #[test]
    fn test_csv_quoting_and_dates() {
        let cipher = Cipher::with_key("k");
        let mut e = entry(&cipher, "e1", "pa\"ss");
        e.service_name = "Acme, \"Inc\"".to_string();
        e.tags.insert("b".to_string());
        e.tags.insert("a".to_string());
        e.is_favorite = true;
        let vaults = vec![Vault::with_id("v1", "Personal")];

        let csv = render_csv(&records(&[e], &vaults, &cipher));
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(
            lines[1],
            "\"Acme, \"\"Inc\"\"\",\"\",\"me\",\"pa\"\"ss\",\"\",\"Personal\",\"a|b\",\"true\",\
             \"2024-03-01T10:20:30.456Z\",\"2024-03-01T10:20:30.456Z\""
        );
    }

    #[test]
    fn test_file_name() {
        assert_eq!(
            file_name(date(), ExportFormat::Csv),
            "cipher-vault-export-2024-03-01.csv.enc"
        );
    }

    #[test]
    fn test_current_view_is_taken_as_given() {
        let cipher = Cipher::insecure();
        let view = vec![entry(&cipher, "b", "pw"), entry(&cipher, "a", "pw")];
        let selected = select_scope(&[], &ExportScope::CurrentView(view.clone()));
        assert_eq!(selected, view);
    }

    #[tokio::test]
    async fn test_write_to_directory() {
        let dir = tempfile::tempdir().unwrap();
        let export = EncryptedExport {
            file_name: file_name(date(), ExportFormat::Json),
            contents: "sealed".to_string(),
            record_count: 1,
            format: ExportFormat::Json,
        };
        let path = export.write_to(&dir.path().join("exports")).await.unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "sealed");
    }
}
