//! Encryption of exchange credentials at rest.
//!
//! Values are sealed with AES-GCM under the raw bytes of
//! `API_ENCRYPTION_KEY` and stored as `"<iv hex>.<ciphertext hex>"`.

use aes_gcm::{
    aead::{consts::U12, Aead, KeyInit},
    aes::Aes192,
    Aes128Gcm, Aes256Gcm, AesGcm, Nonce,
};
use thiserror::Error;

const IV_LEN: usize = 12;

type Aes192Gcm = AesGcm<Aes192, U12>;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Encryption key must be 16, 24 or 32 bytes, got {0}")]
    InvalidKeyLength(usize),

    #[error("Invalid encrypted data format.")]
    InvalidFormat,

    #[error("Failed to encrypt data.")]
    Encrypt,

    #[error("Failed to decrypt data.")]
    Decrypt,
}

/// AES-GCM cipher keyed from the configured secret
#[derive(Clone)]
pub enum CredentialCipher {
    Aes128(Aes128Gcm),
    Aes192(Aes192Gcm),
    Aes256(Aes256Gcm),
}

impl std::fmt::Debug for CredentialCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialCipher::Aes128(_) => f.write_str("CredentialCipher::Aes128"),
            CredentialCipher::Aes192(_) => f.write_str("CredentialCipher::Aes192"),
            CredentialCipher::Aes256(_) => f.write_str("CredentialCipher::Aes256"),
        }
    }
}

impl CredentialCipher {
    /// Key bytes are the UTF-8 bytes of `key`; 16, 24 and 32 bytes select
    /// AES-128, AES-192 and AES-256.
    pub fn from_key(key: &str) -> Result<Self, CryptoError> {
        let bytes = key.as_bytes();
        match bytes.len() {
            16 => Aes128Gcm::new_from_slice(bytes)
                .map(CredentialCipher::Aes128)
                .map_err(|_| CryptoError::InvalidKeyLength(16)),
            24 => Aes192Gcm::new_from_slice(bytes)
                .map(CredentialCipher::Aes192)
                .map_err(|_| CryptoError::InvalidKeyLength(24)),
            32 => Aes256Gcm::new_from_slice(bytes)
                .map(CredentialCipher::Aes256)
                .map_err(|_| CryptoError::InvalidKeyLength(32)),
            n => Err(CryptoError::InvalidKeyLength(n)),
        }
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String, CryptoError> {
        let iv = rand::random::<[u8; IV_LEN]>();
        let nonce = Nonce::from_slice(&iv);

        let sealed = match self {
            CredentialCipher::Aes128(cipher) => cipher.encrypt(nonce, plaintext.as_bytes()),
            CredentialCipher::Aes192(cipher) => cipher.encrypt(nonce, plaintext.as_bytes()),
            CredentialCipher::Aes256(cipher) => cipher.encrypt(nonce, plaintext.as_bytes()),
        }
        .map_err(|_| CryptoError::Encrypt)?;

        Ok(format!("{}.{}", hex::encode(iv), hex::encode(sealed)))
    }

    pub fn decrypt(&self, encrypted: &str) -> Result<String, CryptoError> {
        let (iv_hex, data_hex) = encrypted.split_once('.').ok_or(CryptoError::InvalidFormat)?;
        if iv_hex.is_empty() || data_hex.is_empty() {
            return Err(CryptoError::InvalidFormat);
        }

        let iv = hex::decode(iv_hex).map_err(|_| CryptoError::InvalidFormat)?;
        if iv.len() != IV_LEN {
            return Err(CryptoError::InvalidFormat);
        }
        let data = hex::decode(data_hex).map_err(|_| CryptoError::InvalidFormat)?;
        let nonce = Nonce::from_slice(&iv);

        let plaintext = match self {
            CredentialCipher::Aes128(cipher) => cipher.decrypt(nonce, data.as_slice()),
            CredentialCipher::Aes192(cipher) => cipher.decrypt(nonce, data.as_slice()),
            CredentialCipher::Aes256(cipher) => cipher.decrypt(nonce, data.as_slice()),
        }
        .map_err(|e| {
            tracing::error!("Decryption failed: {:?}", e);
            CryptoError::Decrypt
        })?;

        String::from_utf8(plaintext).map_err(|_| CryptoError::Decrypt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_256: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn sealed_value_has_iv_and_ciphertext_parts() {
        let cipher = CredentialCipher::from_key(KEY_256).unwrap();
        let sealed = cipher.encrypt("my-api-key").unwrap();

        let (iv, data) = sealed.split_once('.').unwrap();
        assert_eq!(iv.len(), IV_LEN * 2);
        // ciphertext + 16 byte tag
        assert_eq!(data.len(), ("my-api-key".len() + 16) * 2);
        assert_eq!(cipher.decrypt(&sealed).unwrap(), "my-api-key");
    }

    #[test]
    fn each_encryption_uses_a_fresh_iv() {
        let cipher = CredentialCipher::from_key("0123456789abcdef").unwrap();
        assert!(matches!(cipher, CredentialCipher::Aes128(_)));
        assert_ne!(cipher.encrypt("secret").unwrap(), cipher.encrypt("secret").unwrap());
    }

    #[test]
    fn accepts_24_byte_keys() {
        let cipher = CredentialCipher::from_key("0123456789abcdef01234567").unwrap();
        assert!(matches!(cipher, CredentialCipher::Aes192(_)));

        let sealed = cipher.encrypt("binance-secret").unwrap();
        assert_eq!(cipher.decrypt(&sealed).unwrap(), "binance-secret");
    }

    #[test]
    fn rejects_unsupported_key_lengths() {
        assert!(matches!(
            CredentialCipher::from_key("short"),
            Err(CryptoError::InvalidKeyLength(5))
        ));
    }

    #[test]
    fn rejects_malformed_input() {
        let cipher = CredentialCipher::from_key(KEY_256).unwrap();
        assert!(matches!(cipher.decrypt("no-dot-here"), Err(CryptoError::InvalidFormat)));
        assert!(matches!(cipher.decrypt(".abcd"), Err(CryptoError::InvalidFormat)));
        assert!(matches!(cipher.decrypt("zz.abcd"), Err(CryptoError::InvalidFormat)));
        assert!(matches!(cipher.decrypt("abcd.abcd"), Err(CryptoError::InvalidFormat)));
    }

    #[test]
    fn wrong_key_fails_authentication() {
        let sealed = CredentialCipher::from_key(KEY_256).unwrap().encrypt("secret").unwrap();
        let other = CredentialCipher::from_key("fedcba9876543210fedcba9876543210").unwrap();
        assert!(matches!(other.decrypt(&sealed), Err(CryptoError::Decrypt)));
    }
}
