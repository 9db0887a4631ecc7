use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::Aes256Gcm;
use rand::RngCore;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use thiserror::Error;

type Nonce = [u8; 12];

const FORMAT_VERSION: u8 = 0x01;

/// Cryptographic errors
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Invalid key: {0}")]
    InvalidKey(String),
    #[error("Encryption failed: {0}")]
    Encryption(String),
    #[error("Decryption failed: {0}")]
    Decryption(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Base64 decode error: {0}")]
    Base64Decode(String),
    #[error("UTF-8 conversion error: {0}")]
    Utf8Error(String),
}

/// Seals stored tokens with AES256-GCM.
///
/// Sealed values are base64-encoded `[version_byte][nonce(12)][ciphertext]`.
#[derive(Clone)]
pub struct TokenCipher {
    cipher: Aes256Gcm,
}

impl TokenCipher {
    /// Build a cipher from a 64 character hex key (32 bytes)
    pub fn from_hex_key(key_hex: &str) -> Result<Self, CryptoError> {
        let key_bytes = hex::decode(key_hex.trim())
            .map_err(|e| CryptoError::InvalidKey(format!("Key is not valid hex: {}", e)))?;

        let key: [u8; 32] = key_bytes.try_into().map_err(|_| {
            CryptoError::InvalidKey("Encryption key must be 32 bytes (256 bits)".to_string())
        })?;

        Ok(Self {
            cipher: Aes256Gcm::new(&key.into()),
        })
    }

    /// Seal a token with a fresh random nonce
    pub fn seal(&self, token: &str) -> Result<String, CryptoError> {
        let mut nonce_bytes: Nonce = [0u8; 12];
        rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt((&nonce_bytes).into(), token.as_bytes())
            .map_err(|e| CryptoError::Encryption(e.to_string()))?;

        let mut sealed = Vec::with_capacity(1 + 12 + ciphertext.len());
        sealed.push(FORMAT_VERSION);
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&ciphertext);

        Ok(BASE64.encode(sealed))
    }

    /// Open a value produced by [`TokenCipher::seal`]
    pub fn open(&self, sealed_b64: &str) -> Result<String, CryptoError> {
        let sealed = BASE64
            .decode(sealed_b64)
            .map_err(|e| CryptoError::Base64Decode(e.to_string()))?;

        if sealed.len() < 13 {
            return Err(CryptoError::InvalidData(
                "Sealed token too short (need at least 1 + 12 bytes for version + nonce)"
                    .to_string(),
            ));
        }

        if sealed[0] != FORMAT_VERSION {
            return Err(CryptoError::InvalidData(format!(
                "Unsupported sealing version: {}",
                sealed[0]
            )));
        }

        let nonce: Nonce = sealed[1..13]
            .try_into()
            .map_err(|_| CryptoError::InvalidData("Failed to extract nonce".to_string()))?;

        let plaintext = self
            .cipher
            .decrypt((&nonce).into(), &sealed[13..])
            .map_err(|e| CryptoError::Decryption(e.to_string()))?;

        String::from_utf8(plaintext).map_err(|e| CryptoError::Utf8Error(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_HEX: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

    #[test]
    fn test_seal_open() {
        let cipher = TokenCipher::from_hex_key(KEY_HEX).expect("Key rejected");
        let sealed = cipher.seal("eyJhbGciOi.access").expect("Seal failed");

        assert_ne!(sealed, "eyJhbGciOi.access");
        assert_eq!(cipher.open(&sealed).expect("Open failed"), "eyJhbGciOi.access");
    }

    #[test]
    fn test_different_nonces() {
        let cipher = TokenCipher::from_hex_key(KEY_HEX).expect("Key rejected");

        let first = cipher.seal("token").expect("Seal 1 failed");
        let second = cipher.seal("token").expect("Seal 2 failed");

        assert_ne!(first, second);
    }

    #[test]
    fn test_short_key_rejected() {
        assert!(matches!(
            TokenCipher::from_hex_key("abcd"),
            Err(CryptoError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_wrong_key_fails_to_open() {
        let cipher = TokenCipher::from_hex_key(KEY_HEX).expect("Key rejected");
        let other = TokenCipher::from_hex_key(&"ff".repeat(32)).expect("Key rejected");

        let sealed = cipher.seal("token").expect("Seal failed");
        assert!(matches!(other.open(&sealed), Err(CryptoError::Decryption(_))));
    }
}
