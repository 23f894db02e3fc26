//! Authenticated encryption for credentials files.
//!
//! Responsibilities:
//! - Provide AES-128-GCM decryption of credential envelopes.
//! - Provide the matching encryption and key generation used to author
//!   credentials files.
//! - Interpret key material as hexadecimal.
//!
//! Does NOT handle:
//! - Locating key material (see `key.rs`).
//! - Decoding the plaintext framing (see `framing.rs`).

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes128Gcm, Nonce};
use rand::RngExt;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use super::envelope::Envelope;
use super::framing::MAX_FRAMED_LEN;
use crate::constants::{AUTH_TAG_LEN, IV_LEN, KEY_LEN};

/// Errors that can occur while decrypting or encrypting credentials.
///
/// Every variant is recoverable: a caller holding more key candidates should
/// try the next one.
#[derive(Debug, Error)]
pub enum DecryptError {
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("Key material is not valid hexadecimal: {0}")]
    InvalidKeyEncoding(String),

    #[error("Invalid key size: expected {} bytes, got {}", KEY_LEN, .0)]
    InvalidKeySize(usize),

    #[error("Invalid IV size: expected {} bytes, got {}", IV_LEN, .0)]
    InvalidIvSize(usize),

    #[error("Invalid auth tag size: expected {} bytes, got {}", AUTH_TAG_LEN, .0)]
    InvalidAuthTagSize(usize),

    #[error("Malformed credentials envelope: {0}")]
    MalformedEnvelope(String),

    #[error("Malformed credentials payload: {0}")]
    MalformedPayload(String),

    #[error("Payload of {} bytes exceeds the {} byte framing limit", .0, MAX_FRAMED_LEN)]
    PayloadTooLarge(usize),
}

pub type Result<T> = std::result::Result<T, DecryptError>;

/// Converts hexadecimal key material into a 16-byte key.
pub fn key_bytes(material: &SecretString) -> Result<[u8; KEY_LEN]> {
    let bytes = hex::decode(material.expose_secret().trim())
        .map_err(|e| DecryptError::InvalidKeyEncoding(e.to_string()))?;
    if bytes.len() != KEY_LEN {
        return Err(DecryptError::InvalidKeySize(bytes.len()));
    }
    let mut key = [0u8; KEY_LEN];
    key.copy_from_slice(&bytes);
    Ok(key)
}

/// Decrypts and authenticates an envelope with hexadecimal key material.
pub fn decrypt(envelope: &Envelope, material: &SecretString) -> Result<Vec<u8>> {
    let key = key_bytes(material)?;
    if envelope.iv.len() != IV_LEN {
        return Err(DecryptError::InvalidIvSize(envelope.iv.len()));
    }
    if envelope.auth_tag.len() != AUTH_TAG_LEN {
        return Err(DecryptError::InvalidAuthTagSize(envelope.auth_tag.len()));
    }

    let cipher = Aes128Gcm::new(&key.into());
    let nonce = Nonce::from_slice(&envelope.iv);

    let mut sealed = Vec::with_capacity(envelope.ciphertext.len() + AUTH_TAG_LEN);
    sealed.extend_from_slice(&envelope.ciphertext);
    sealed.extend_from_slice(&envelope.auth_tag);

    cipher
        .decrypt(nonce, sealed.as_slice())
        .map_err(|e| DecryptError::DecryptionFailed(e.to_string()))
}

/// Encrypts `plaintext` under a fresh random IV.
pub fn encrypt(plaintext: &[u8], material: &SecretString) -> Result<Envelope> {
    let key = key_bytes(material)?;
    let cipher = Aes128Gcm::new(&key.into());
    let mut iv = [0u8; IV_LEN];
    rand::rng().fill(&mut iv);
    let nonce = Nonce::from_slice(&iv);

    let mut ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| DecryptError::EncryptionFailed(e.to_string()))?;
    let auth_tag = ciphertext.split_off(ciphertext.len() - AUTH_TAG_LEN);

    Ok(Envelope {
        ciphertext,
        iv: iv.to_vec(),
        auth_tag,
    })
}

/// Generates fresh key material, hex encoded, as written to key files.
pub fn generate_key() -> SecretString {
    let mut key = [0u8; KEY_LEN];
    rand::rng().fill(&mut key);
    SecretString::new(hex::encode(key).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(value: &str) -> SecretString {
        SecretString::new(value.to_string().into())
    }

    #[test]
    fn test_encryption_roundtrip() {
        let key = generate_key();
        let envelope = encrypt(b"sensitive data", &key).unwrap();
        assert_eq!(envelope.iv.len(), IV_LEN);
        assert_eq!(envelope.auth_tag.len(), AUTH_TAG_LEN);

        let decrypted = decrypt(&envelope, &key).unwrap();
        assert_eq!(decrypted, b"sensitive data");
    }

    #[test]
    fn test_wrong_key_fails_authentication() {
        let envelope = encrypt(b"sensitive data", &generate_key()).unwrap();
        let err = decrypt(&envelope, &generate_key()).unwrap_err();
        assert!(matches!(err, DecryptError::DecryptionFailed(_)));
    }

    #[test]
    fn test_tampered_tag_fails_authentication() {
        let key = generate_key();
        let mut envelope = encrypt(b"sensitive data", &key).unwrap();
        envelope.auth_tag[0] ^= 0xff;
        assert!(matches!(
            decrypt(&envelope, &key),
            Err(DecryptError::DecryptionFailed(_))
        ));
    }

    #[test]
    fn test_key_material_is_trimmed_hex() {
        let key = key_bytes(&secret("000102030405060708090a0b0c0d0e0f\n")).unwrap();
        assert_eq!(key[15], 0x0f);
    }

    #[test]
    fn test_key_material_validation() {
        assert!(matches!(
            key_bytes(&secret("not hex")),
            Err(DecryptError::InvalidKeyEncoding(_))
        ));
        assert!(matches!(
            key_bytes(&secret("0011")),
            Err(DecryptError::InvalidKeySize(2))
        ));
    }

    #[test]
    fn test_size_errors_name_expected_lengths() {
        assert_eq!(
            DecryptError::InvalidKeySize(2).to_string(),
            format!("Invalid key size: expected {} bytes, got 2", KEY_LEN)
        );
        assert_eq!(
            DecryptError::InvalidIvSize(11).to_string(),
            format!("Invalid IV size: expected {} bytes, got 11", IV_LEN)
        );
        assert_eq!(
            DecryptError::InvalidAuthTagSize(4).to_string(),
            format!("Invalid auth tag size: expected {} bytes, got 4", AUTH_TAG_LEN)
        );
    }

    #[test]
    fn test_rejects_bad_iv_size() {
        let key = generate_key();
        let mut envelope = encrypt(b"data", &key).unwrap();
        envelope.iv.pop();
        assert!(matches!(
            decrypt(&envelope, &key),
            Err(DecryptError::InvalidIvSize(11))
        ));
    }
}
