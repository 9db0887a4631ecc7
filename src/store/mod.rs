//! Credential persistence
//!
//! Tokens live under two fixed keys, mirroring browser local storage. A pair
//! with either key missing or empty is reported as no credential at all.

use thiserror::Error;

use crate::models::Credential;
use crate::utils::CryptoError;

pub mod file;
pub mod memory;

pub use file::FileCredentialStore;
pub use memory::InMemoryCredentialStore;

pub const ACCESS_TOKEN_KEY: &str = "accessToken";
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// Credential store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Credential file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Credential file is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Token sealing failed: {0}")]
    Crypto(#[from] CryptoError),
}

/// Persists the access/refresh pair across runs.
///
/// `save` writes both tokens together or neither. Implementations must not
/// cache: every `load` reflects the persisted state at call time.
pub trait CredentialStore: Send + Sync {
    fn save(&self, credential: &Credential) -> Result<(), StoreError>;

    fn load(&self) -> Option<Credential>;

    fn clear(&self) -> Result<(), StoreError>;
}

/// Assemble a credential from raw stored values, treating a partial pair as absent
pub(crate) fn credential_from_parts(access: Option<&str>, refresh: Option<&str>) -> Option<Credential> {
    match (access, refresh) {
        (Some(access), Some(refresh)) if !access.is_empty() && !refresh.is_empty() => {
            Some(Credential::new(access, refresh))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_pair_is_absent() {
        assert!(credential_from_parts(Some("a1"), None).is_none());
        assert!(credential_from_parts(None, Some("r1")).is_none());
        assert!(credential_from_parts(Some(""), Some("r1")).is_none());
        assert_eq!(
            credential_from_parts(Some("a1"), Some("r1")),
            Some(Credential::new("a1", "r1"))
        );
    }
}
