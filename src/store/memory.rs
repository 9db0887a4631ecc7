use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use super::{credential_from_parts, CredentialStore, StoreError, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use crate::models::Credential;

/// Key/value credential store held in memory
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    entries: Mutex<HashMap<String, String>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(credential: &Credential) -> Self {
        let store = Self::new();
        store.set_item(ACCESS_TOKEN_KEY, &credential.access_token);
        store.set_item(REFRESH_TOKEN_KEY, &credential.refresh_token);
        store
    }

    /// Write a single raw key, like `localStorage.setItem`
    pub fn set_item(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
    }

    /// Remove a single raw key, like `localStorage.removeItem`
    pub fn remove_item(&self, key: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn save(&self, credential: &Credential) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(ACCESS_TOKEN_KEY.to_string(), credential.access_token.clone());
        entries.insert(REFRESH_TOKEN_KEY.to_string(), credential.refresh_token.clone());
        Ok(())
    }

    fn load(&self) -> Option<Credential> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        credential_from_parts(
            entries.get(ACCESS_TOKEN_KEY).map(String::as_str),
            entries.get(REFRESH_TOKEN_KEY).map(String::as_str),
        )
    }

    fn clear(&self) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(ACCESS_TOKEN_KEY);
        entries.remove(REFRESH_TOKEN_KEY);
        Ok(())
    }
}
