use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use super::{credential_from_parts, CredentialStore, StoreError, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use crate::models::Credential;
use crate::utils::TokenCipher;

/// Credential store backed by a JSON object file
///
/// The file holds `{"accessToken": ..., "refreshToken": ...}`, optionally with
/// both values sealed by a [`TokenCipher`]. Other keys in the file are left
/// untouched, whatever their value type.
pub struct FileCredentialStore {
    path: PathBuf,
    cipher: Option<TokenCipher>,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cipher: None,
        }
    }

    /// Seal tokens at rest with the given cipher
    pub fn with_cipher(path: impl Into<PathBuf>, cipher: TokenCipher) -> Self {
        Self {
            path: path.into(),
            cipher: Some(cipher),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<Map<String, Value>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(Map::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Write to a uniquely named sibling temp file then rename over the
    /// target, so readers never observe a half-written pair and concurrent
    /// writers never share a temp file
    fn write_entries(&self, entries: &Map<String, Value>) -> Result<(), StoreError> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)?;

        let mut tmp = NamedTempFile::new_in(parent)?;
        tmp.write_all(&serde_json::to_vec_pretty(entries)?)?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }

    fn seal(&self, token: &str) -> Result<String, StoreError> {
        match &self.cipher {
            Some(cipher) => Ok(cipher.seal(token)?),
            None => Ok(token.to_string()),
        }
    }

    fn open(&self, key: &str, stored: Option<&Value>) -> Option<String> {
        let stored = stored?.as_str()?;
        match &self.cipher {
            Some(cipher) => match cipher.open(stored) {
                Ok(token) => Some(token),
                Err(e) => {
                    warn!("Stored {} could not be opened, treating as absent: {}", key, e);
                    None
                }
            },
            None => Some(stored.to_string()),
        }
    }
}

impl CredentialStore for FileCredentialStore {
    fn save(&self, credential: &Credential) -> Result<(), StoreError> {
        // Seal both before touching the file so a failure writes nothing
        let access = self.seal(&credential.access_token)?;
        let refresh = self.seal(&credential.refresh_token)?;

        let mut entries = self.read_entries().unwrap_or_else(|e| {
            warn!("Replacing unreadable credential file {}: {}", self.path.display(), e);
            Map::new()
        });
        entries.insert(ACCESS_TOKEN_KEY.to_string(), Value::String(access));
        entries.insert(REFRESH_TOKEN_KEY.to_string(), Value::String(refresh));

        self.write_entries(&entries)?;
        debug!("Credential saved to {}", self.path.display());
        Ok(())
    }

    fn load(&self) -> Option<Credential> {
        let entries = match self.read_entries() {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Could not read credential file {}: {}", self.path.display(), e);
                return None;
            }
        };

        let access = self.open(ACCESS_TOKEN_KEY, entries.get(ACCESS_TOKEN_KEY));
        let refresh = self.open(REFRESH_TOKEN_KEY, entries.get(REFRESH_TOKEN_KEY));
        credential_from_parts(access.as_deref(), refresh.as_deref())
    }

    fn clear(&self) -> Result<(), StoreError> {
        let mut entries = match self.read_entries() {
            Ok(entries) => entries,
            Err(StoreError::Serialization(_)) => Map::new(),
            Err(e) => return Err(e),
        };
        entries.remove(ACCESS_TOKEN_KEY);
        entries.remove(REFRESH_TOKEN_KEY);

        if entries.is_empty() {
            match fs::remove_file(&self.path) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        } else {
            self.write_entries(&entries)?;
        }

        debug!("Credential cleared from {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_HEX: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

    #[test]
    fn test_pair_survives_new_store_instance() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session").join("credentials.json");

        FileCredentialStore::new(&path)
            .save(&Credential::new("a1", "r1"))
            .unwrap();

        let reopened = FileCredentialStore::new(&path);
        assert_eq!(reopened.load(), Some(Credential::new("a1", "r1")));
    }

    #[test]
    fn test_missing_file_loads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("credentials.json"));

        assert!(store.load().is_none());
        store.clear().unwrap();
    }

    #[test]
    fn test_partial_file_loads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        fs::write(&path, r#"{"accessToken": "a1"}"#).unwrap();

        assert!(FileCredentialStore::new(&path).load().is_none());
    }

    #[test]
    fn test_clear_keeps_unrelated_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        fs::write(&path, r#"{"theme": "dark"}"#).unwrap();

        let store = FileCredentialStore::new(&path);
        store.save(&Credential::new("a1", "r1")).unwrap();
        store.clear().unwrap();

        assert!(store.load().is_none());
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("theme"));
        assert!(!content.contains(ACCESS_TOKEN_KEY));
    }

    #[test]
    fn test_save_and_clear_keep_non_string_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        fs::write(&path, r#"{"theme": "dark", "visits": 3, "layout": {"compact": true}}"#).unwrap();

        let store = FileCredentialStore::new(&path);
        store.save(&Credential::new("a1", "r1")).unwrap();

        assert_eq!(store.load(), Some(Credential::new("a1", "r1")));
        let saved: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved["visits"], 3);
        assert_eq!(saved["layout"]["compact"], true);

        store.clear().unwrap();

        let cleared: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(cleared["theme"], "dark");
        assert_eq!(cleared["visits"], 3);
        assert!(cleared.get(ACCESS_TOKEN_KEY).is_none());
    }

    #[test]
    fn test_concurrent_saves_all_succeed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let path = path.clone();
                std::thread::spawn(move || {
                    FileCredentialStore::new(path).save(&Credential::new(format!("a{}", i), "r1"))
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap().unwrap();
        }
        assert!(FileCredentialStore::new(&path).load().is_some());
    }

    #[test]
    fn test_non_string_token_loads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        fs::write(&path, r#"{"accessToken": 7, "refreshToken": "r1"}"#).unwrap();

        assert!(FileCredentialStore::new(&path).load().is_none());
    }

    #[test]
    fn test_sealed_tokens_are_not_stored_in_plain_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        let cipher = TokenCipher::from_hex_key(KEY_HEX).unwrap();

        let store = FileCredentialStore::with_cipher(&path, cipher);
        store.save(&Credential::new("plain-access", "plain-refresh")).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(!content.contains("plain-access"));
        assert_eq!(store.load(), Some(Credential::new("plain-access", "plain-refresh")));
    }

    #[test]
    fn test_tokens_sealed_with_other_key_load_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");

        let writer = FileCredentialStore::with_cipher(&path, TokenCipher::from_hex_key(KEY_HEX).unwrap());
        writer.save(&Credential::new("a1", "r1")).unwrap();

        let reader = FileCredentialStore::with_cipher(
            &path,
            TokenCipher::from_hex_key(&"ff".repeat(32)).unwrap(),
        );
        assert!(reader.load().is_none());
    }
}
