//! Loading an encrypted credentials file into a raw record.
//!
//! Responsibilities:
//! - Read the envelope, try every resolvable key in order, decode the framed
//!   plaintext and hand it to the YAML parser.
//! - Apply strict/non-strict failure policy.
//!
//! Does NOT handle:
//! - Merging the result into a tree (see `ConfigBuilder::load_credentials`).
//!
//! Invariants:
//! - A missing credentials file is never an error; credentials are opt-in.
//! - A failed decryption is recoverable until every candidate is exhausted.
//! - Non-strict mode never fails: problems are logged and an empty record
//!   returned. Strict mode returns the error naming every attempted source.

use std::path::Path;

use secrecy::{ExposeSecret, SecretString};

use super::cipher::{self, DecryptError};
use super::envelope::Envelope;
use super::framing::{decode_framed_string, encode_framed_string};
use super::key::{KeyCandidate, KeyResolver};
use crate::RawRecord;
use crate::loader::{ConfigError, parse_yaml};

/// Decrypts credentials files with keys located by a [`KeyResolver`].
#[derive(Debug, Clone)]
pub struct CredentialsDecoder {
    resolver: KeyResolver,
    strict: bool,
}

impl CredentialsDecoder {
    pub fn new(resolver: KeyResolver) -> Self {
        Self {
            resolver,
            strict: false,
        }
    }

    /// Fail instead of returning an empty record when decryption fails.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn resolver(&self) -> &KeyResolver {
        &self.resolver
    }

    /// Loads the credentials file at `path` using the first candidate key
    /// that decrypts it.
    ///
    /// # Errors
    ///
    /// In strict mode only:
    /// - `ConfigError::Credentials` when no candidate decrypts the file.
    /// - `ConfigError::Parse` when the envelope or the decrypted document is
    ///   corrupt.
    /// - `ConfigError::Io` when the file exists but cannot be read.
    pub fn load(&self, path: &Path, candidates: &[KeyCandidate]) -> Result<RawRecord, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No credentials file, skipping");
            return Ok(RawRecord::new());
        }

        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => return self.fail(path, ConfigError::Io(e)),
        };
        let envelope = match Envelope::parse(&contents) {
            Ok(envelope) => envelope,
            Err(e) => return self.fail(path, ConfigError::parse(path, e)),
        };

        let mut last_error = None;
        for key in self.resolver.resolve_all(candidates) {
            match decrypt_document(&envelope, key.material()) {
                Ok(document) => {
                    tracing::debug!(
                        path = %path.display(),
                        source = %key.source,
                        "Decrypted credentials"
                    );
                    return match parse_yaml(&document) {
                        Ok(record) => Ok(record),
                        Err(e) => self.fail(path, ConfigError::parse(path, e)),
                    };
                }
                Err(e) => {
                    tracing::debug!(
                        path = %path.display(),
                        source = %key.source,
                        error = %e,
                        "Key did not decrypt credentials, trying next"
                    );
                    last_error = Some(e);
                }
            }
        }

        let attempted = candidates.iter().map(ToString::to_string).collect();
        self.fail(
            path,
            ConfigError::Credentials {
                path: path.to_path_buf(),
                attempted,
                source: last_error,
            },
        )
    }

    fn fail(&self, path: &Path, error: ConfigError) -> Result<RawRecord, ConfigError> {
        if self.strict {
            return Err(error);
        }
        tracing::warn!(
            path = %path.display(),
            error = %error,
            "Could not load credentials, continuing without them"
        );
        Ok(RawRecord::new())
    }
}

/// Decrypts an envelope and recovers the embedded document.
pub fn decrypt_document(envelope: &Envelope, material: &SecretString) -> Result<String, DecryptError> {
    let plaintext = cipher::decrypt(envelope, material)?;
    decode_framed_string(&plaintext)
}

/// Produces the text of a credentials file holding `document`.
pub fn encrypt_credentials(document: &str, material: &SecretString) -> Result<String, DecryptError> {
    let framed = encode_framed_string(document)?;
    let envelope = cipher::encrypt(&framed, material)?;
    Ok(envelope.to_string())
}

/// Writes `document` encrypted to `path`, creating parent directories.
///
/// # Errors
///
/// - `ConfigError::Encryption` when the key is unusable or the document is
///   too large to frame. Nothing is written.
/// - `ConfigError::Io` when the file cannot be written.
pub fn write_credentials(
    path: &Path,
    document: &str,
    material: &SecretString,
) -> Result<(), ConfigError> {
    let text = encrypt_credentials(document, material).map_err(|source| ConfigError::Encryption {
        path: path.to_path_buf(),
        source,
    })?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, text)?;
    tracing::debug!(path = %path.display(), "Credentials written");
    Ok(())
}

/// Writes key material to a key file, creating parent directories.
pub fn write_key_file(path: &Path, material: &SecretString) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, material.expose_secret())?;
    Ok(())
}
