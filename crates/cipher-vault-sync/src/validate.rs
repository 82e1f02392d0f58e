//! Structural checks on caller input, run before anything is applied.

use cipher_vault_core::EntryDraft;

use crate::error::SyncError;
use crate::Result;

/// Check the fields every entry needs.
pub fn validate_draft(draft: &EntryDraft) -> Result<()> {
    let mut errors = Vec::new();

    if draft.service_name.trim().is_empty() {
        errors.push("service name is required".to_string());
    }
    if draft.username.trim().is_empty() {
        errors.push("username is required".to_string());
    }
    if draft.secret.is_empty() {
        errors.push("password is required".to_string());
    }
    if let Some(raw) = normalized_optional(draft.url.as_deref()) {
        if let Err(e) = url::Url::parse(&raw) {
            errors.push(format!("url '{raw}' is not a valid absolute URL: {e}"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(SyncError::Validation(errors.join("; ")))
    }
}

/// Trim an optional field, mapping blank to `None`.
pub fn normalized_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Check and trim a vault name.
pub fn validate_vault_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(SyncError::Validation("vault name is required".to_string()));
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_draft() {
        let draft = EntryDraft::new("GitHub", "octo", "pw").with_url("https://github.com");
        assert!(validate_draft(&draft).is_ok());
    }

    #[test]
    fn test_missing_fields_are_all_reported() {
        let draft = EntryDraft::new(" ", "", "");
        let err = validate_draft(&draft).unwrap_err().to_string();
        assert!(err.contains("service name"));
        assert!(err.contains("username"));
        assert!(err.contains("password"));
    }

    #[test]
    fn test_relative_url_rejected() {
        let draft = EntryDraft::new("GitHub", "octo", "pw").with_url("github.com/login");
        assert!(matches!(
            validate_draft(&draft),
            Err(SyncError::Validation(_))
        ));
    }

    #[test]
    fn test_blank_url_is_ignored() {
        let draft = EntryDraft::new("GitHub", "octo", "pw").with_url("   ");
        assert!(validate_draft(&draft).is_ok());
        assert_eq!(normalized_optional(draft.url.as_deref()), None);
    }

    #[test]
    fn test_vault_name() {
        assert_eq!(validate_vault_name("  Work ").unwrap(), "Work");
        assert!(validate_vault_name(" ").is_err());
    }
}
