//! Prior secrets of an entry.
//!
//! History items hold the secret exactly as it was persisted (ciphertext),
//! so they are decrypted through the same cipher as the live secret.

use chrono::{DateTime, Utc};
use cipher_vault_core::{CredentialEntry, SecretHistoryEntry, SecretString};
use cipher_vault_crypto::{Cipher, DecryptedSecret};

/// History after replacing `entry`'s secret with `new_secret`.
///
/// Returns `None` when the secret did not change, in which case neither the
/// secret nor the history should be rewritten.
pub fn record_change(
    entry: &CredentialEntry,
    new_secret: &SecretString,
    cipher: &Cipher,
    now: DateTime<Utc>,
) -> Option<Vec<SecretHistoryEntry>> {
    if new_secret.matches(&cipher.decrypt(&entry.secret)) {
        return None;
    }
    let mut scratch = entry.clone();
    scratch.push_history(entry.secret.clone(), now);
    Some(scratch.secret_history)
}

/// True when `candidate` was used as a secret before.
pub fn is_in_history(history: &[SecretHistoryEntry], candidate: &str, cipher: &Cipher) -> bool {
    history.iter().any(|h| cipher.decrypt(&h.secret) == candidate)
}

/// Decrypted history, newest first.
pub fn reveal_history(
    history: &[SecretHistoryEntry],
    cipher: &Cipher,
) -> Vec<(DateTime<Utc>, DecryptedSecret)> {
    history
        .iter()
        .map(|h| (h.timestamp, cipher.reveal(&h.secret)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cipher_vault_core::{EntryId, VaultId, MAX_HISTORY_ENTRIES};

    fn entry(cipher: &Cipher, secret: &str) -> CredentialEntry {
        let now = Utc::now();
        CredentialEntry {
            id: EntryId::new("e1"),
            vault_id: VaultId::new("v1"),
            service_name: "svc".to_string(),
            url: None,
            username: "me".to_string(),
            secret: cipher.encrypt(secret).unwrap(),
            notes: None,
            tags: Default::default(),
            is_favorite: false,
            created_at: now,
            updated_at: now,
            deleted_at: None,
            secret_history: Vec::new(),
        }
    }

    #[test]
    fn test_unchanged_secret_records_nothing() {
        let cipher = Cipher::with_key("k");
        let e = entry(&cipher, "same");
        assert!(record_change(&e, &SecretString::new("same"), &cipher, Utc::now()).is_none());
    }

    #[test]
    fn test_changed_secret_pushes_prior_ciphertext() {
        let cipher = Cipher::with_key("k");
        let e = entry(&cipher, "old");
        let history = record_change(&e, &SecretString::new("new"), &cipher, Utc::now()).unwrap();

        assert_eq!(history.len(), 1);
        assert_eq!(history[0].secret, e.secret);
        assert!(is_in_history(&history, "old", &cipher));
        assert!(!is_in_history(&history, "new", &cipher));
    }

    #[test]
    fn test_history_stays_capped() {
        let cipher = Cipher::with_key("k");
        let mut e = entry(&cipher, "s0");
        for i in 1..=(MAX_HISTORY_ENTRIES + 2) {
            let next = format!("s{i}");
            e.secret_history = record_change(&e, &SecretString::new(next.as_str()), &cipher, Utc::now()).unwrap();
            e.secret = cipher.encrypt(&next).unwrap();
        }

        assert_eq!(e.secret_history.len(), MAX_HISTORY_ENTRIES);
        let revealed = reveal_history(&e.secret_history, &cipher);
        assert_eq!(revealed[0].1.expose(), format!("s{}", MAX_HISTORY_ENTRIES + 1));
        assert!(!is_in_history(&e.secret_history, "s0", &cipher));
    }
}
