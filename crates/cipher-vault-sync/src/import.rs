//! Parsing of CSV and JSON files exported by other password managers.
//!
//! Every parsed row becomes an [`EntryDraft`] tagged `imported`. Drafts are
//! not validated here; the coordinator validates each one on create.

use std::path::Path;

use cipher_vault_core::EntryDraft;
use serde_json::Value;

use crate::error::SyncError;
use crate::Result;

/// Tag attached to every imported draft.
pub const IMPORTED_TAG: &str = "imported";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Csv,
    Json,
}

impl ImportFormat {
    /// Pick the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("csv") => Ok(Self::Csv),
            Some("json") => Ok(Self::Json),
            _ => Err(SyncError::Import(
                "unsupported file format, use CSV or JSON".to_string(),
            )),
        }
    }
}

/// Parse `text` in the given format. An empty result is an error.
pub fn parse(text: &str, format: ImportFormat) -> Result<Vec<EntryDraft>> {
    let drafts = match format {
        ImportFormat::Csv => parse_csv(text)?,
        ImportFormat::Json => parse_json(text)?,
    };
    if drafts.is_empty() {
        return Err(SyncError::Import("no entries found in the file".to_string()));
    }
    Ok(drafts)
}

fn draft(
    index: usize,
    service: Option<String>,
    username: Option<String>,
    password: Option<String>,
    url: Option<String>,
    notes: Option<String>,
) -> EntryDraft {
    let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
    let mut draft = EntryDraft::new(
        non_empty(service).unwrap_or_else(|| format!("Imported Item {}", index + 1)),
        username.unwrap_or_default(),
        password.unwrap_or_default(),
    )
    .with_tag(IMPORTED_TAG);
    draft.url = non_empty(url);
    draft.notes = non_empty(notes);
    draft
}

fn find_column(headers: &[String], needles: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| needles.iter().any(|n| h.contains(n)))
}

/// Parse CSV with a header row. Columns are found by name: service
/// (`name`/`service`/`title`), username (`user`/`login`), `password`, url
/// (`url`/`website`/`site`) and `note`.
pub fn parse_csv(text: &str) -> Result<Vec<EntryDraft>> {
    let records = split_records(text);
    if records.len() < 2 {
        return Err(SyncError::Import(
            "CSV file must have a header and at least one data row".to_string(),
        ));
    }

    let headers: Vec<String> = records[0].iter().map(|h| h.trim().to_lowercase()).collect();
    let service = find_column(&headers, &["name", "service", "title"]);
    let username = find_column(&headers, &["username", "user", "login"]);
    let password = find_column(&headers, &["password"]);
    let url = find_column(&headers, &["url", "website", "site"]);
    let notes = find_column(&headers, &["note"]);

    let (Some(service), Some(username), Some(password)) = (service, username, password) else {
        return Err(SyncError::Import(
            "CSV must contain columns for service name, username, and password".to_string(),
        ));
    };

    records[1..]
        .iter()
        .enumerate()
        .map(|(i, row)| {
            if row.len() < 3 {
                return Err(SyncError::Import(format!(
                    "invalid row {}: insufficient columns",
                    i + 2
                )));
            }
            let col = |idx: usize| row.get(idx).map(|v| v.trim().to_string());
            Ok(draft(
                i,
                col(service),
                col(username),
                col(password),
                url.and_then(col),
                notes.and_then(col),
            ))
        })
        .collect()
}

/// Split CSV text into records, honouring double-quoted fields (which may
/// contain commas, doubled quotes and newlines). Blank lines are skipped.
fn split_records(text: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    let mut finish_record = |record: &mut Vec<String>, field: &mut String| {
        record.push(std::mem::take(field));
        let row = std::mem::take(record);
        if !(row.len() == 1 && row[0].trim().is_empty()) {
            records.push(row);
        }
    };

    while let Some(c) = chars.next() {
        match (c, in_quotes) {
            ('"', true) if chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            ('"', _) => in_quotes = !in_quotes,
            (',', false) => record.push(std::mem::take(&mut field)),
            ('\r', false) => {}
            ('\n', false) => finish_record(&mut record, &mut field),
            (c, _) => field.push(c),
        }
    }
    finish_record(&mut record, &mut field);

    records
}

fn string_field(item: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| item.get(*k).and_then(Value::as_str))
        .find(|v| !v.is_empty())
        .map(str::to_string)
}

/// Parse a JSON array of objects.
pub fn parse_json(text: &str) -> Result<Vec<EntryDraft>> {
    let data: Value =
        serde_json::from_str(text).map_err(|e| SyncError::Import(format!("invalid JSON: {e}")))?;
    let items = data.as_array().ok_or_else(|| {
        SyncError::Import("JSON file must contain an array of entries".to_string())
    })?;

    Ok(items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            draft(
                i,
                string_field(item, &["serviceName", "name", "title"]),
                string_field(item, &["username", "user", "login"]),
                string_field(item, &["password"]),
                string_field(item, &["url", "website"]),
                string_field(item, &["notes", "note"]),
            )
        })
        .collect())
}
