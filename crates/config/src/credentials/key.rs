//! Locating decryption key material.
//!
//! Responsibilities:
//! - Walk an ordered list of key candidates (environment variables, key
//!   files) and yield the material each one provides.
//! - Rewrite short environment names to the secret-key naming convention.
//!
//! Does NOT handle:
//! - Validating key material. A resolved key only means "found a string";
//!   whether it decrypts anything is decided by the decoder.
//!
//! Invariants:
//! - Candidates are consulted strictly in order.
//! - Empty or whitespace-only material is treated as absent.
//! - Key material is only ever held as a `SecretString`.

use std::fmt;
use std::path::{Path, PathBuf};

use secrecy::SecretString;

use crate::constants::{SECRET_KEY_PREFIX, SECRET_KEY_SUFFIX};
use crate::loader::env_var_or_none;

/// One named source of key material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyCandidate {
    /// An environment variable; short names are rewritten, see
    /// [`secret_key_env_name`].
    Env(String),
    /// A key file holding hexadecimal text.
    File(PathBuf),
}

impl KeyCandidate {
    pub fn env(name: impl Into<String>) -> Self {
        Self::Env(name.into())
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }
}

impl fmt::Display for KeyCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyCandidate::Env(name) => write!(f, "ENV[\"{}\"]", secret_key_env_name(name)),
            KeyCandidate::File(path) => write!(f, "key file `{}'", path.display()),
        }
    }
}

/// Rewrites `master` to `RAILS_MASTER_KEY`; names already carrying the
/// `RAILS_` prefix pass through.
pub fn secret_key_env_name(identifier: &str) -> String {
    if identifier.starts_with(SECRET_KEY_PREFIX) {
        identifier.to_string()
    } else {
        format!(
            "{}{}{}",
            SECRET_KEY_PREFIX,
            identifier.to_uppercase(),
            SECRET_KEY_SUFFIX
        )
    }
}

/// Key material together with the candidate that supplied it.
pub struct ResolvedKey {
    pub source: KeyCandidate,
    material: SecretString,
}

impl ResolvedKey {
    pub fn material(&self) -> &SecretString {
        &self.material
    }
}

impl fmt::Debug for ResolvedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedKey")
            .field("source", &self.source)
            .field("material", &"[REDACTED]")
            .finish()
    }
}

/// Resolves key candidates, reading relative key files from `root`.
#[derive(Debug, Clone)]
pub struct KeyResolver {
    root: PathBuf,
}

impl KeyResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the first candidate that yields non-empty material.
    pub fn resolve(&self, candidates: &[KeyCandidate]) -> Option<ResolvedKey> {
        self.resolve_all(candidates).next()
    }

    /// Lazily yields every candidate that provides material, in order.
    pub fn resolve_all<'a>(
        &'a self,
        candidates: &'a [KeyCandidate],
    ) -> impl Iterator<Item = ResolvedKey> + 'a {
        candidates
            .iter()
            .filter_map(move |candidate| self.resolve_one(candidate))
    }

    fn resolve_one(&self, candidate: &KeyCandidate) -> Option<ResolvedKey> {
        let material = match candidate {
            KeyCandidate::Env(name) => env_var_or_none(&secret_key_env_name(name))?,
            KeyCandidate::File(path) => self.read_key_file(path)?,
        };
        tracing::debug!(source = %candidate, "Resolved credentials key");
        Some(ResolvedKey {
            source: candidate.clone(),
            material: SecretString::new(material.into()),
        })
    }

    fn read_key_file(&self, path: &Path) -> Option<String> {
        let path = self.absolute(path);
        if !path.is_file() {
            return None;
        }
        match std::fs::read_to_string(&path) {
            Ok(contents) => {
                let trimmed = contents.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Failed to read key file, skipping"
                );
                None
            }
        }
    }

    fn absolute(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_secret_key_env_name() {
        assert_eq!(secret_key_env_name("master"), "RAILS_MASTER_KEY");
        assert_eq!(secret_key_env_name("staging"), "RAILS_STAGING_KEY");
        assert_eq!(secret_key_env_name("RAILS_MASTER_KEY"), "RAILS_MASTER_KEY");
    }

    #[test]
    fn test_candidate_display() {
        assert_eq!(
            KeyCandidate::env("master").to_string(),
            "ENV[\"RAILS_MASTER_KEY\"]"
        );
        assert_eq!(
            KeyCandidate::file("/no/such/key").to_string(),
            "key file `/no/such/key'"
        );
    }

    #[test]
    #[serial]
    fn test_nothing_resolves() {
        let resolver = KeyResolver::new("/");
        temp_env::with_var_unset("RAILS_NOTHING_KEY", || {
            let candidates = [
                KeyCandidate::env("nothing"),
                KeyCandidate::file("/no/such/key"),
            ];
            assert!(resolver.resolve(&candidates).is_none());
        });
    }

    #[test]
    #[serial]
    fn test_env_candidate_wins_in_order() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("master.key"), "from-file\n").unwrap();
        let resolver = KeyResolver::new(temp_dir.path());

        temp_env::with_var("RAILS_MASTER_KEY", Some("from-env"), || {
            let candidates = [
                KeyCandidate::env("master"),
                KeyCandidate::file("master.key"),
            ];
            let key = resolver.resolve(&candidates).unwrap();
            assert_eq!(key.source, KeyCandidate::env("master"));
            assert_eq!(key.material().expose_secret(), "from-env");

            let all: Vec<_> = resolver.resolve_all(&candidates).collect();
            assert_eq!(all.len(), 2);
            assert_eq!(all[1].material().expose_secret(), "from-file");
        });
    }

    #[test]
    #[serial]
    fn test_blank_env_falls_through_to_file() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("master.key"), "abc123").unwrap();
        let resolver = KeyResolver::new(temp_dir.path());

        temp_env::with_var("RAILS_MASTER_KEY", Some("   "), || {
            let candidates = [
                KeyCandidate::env("master"),
                KeyCandidate::file("master.key"),
            ];
            let key = resolver.resolve(&candidates).unwrap();
            assert_eq!(key.source, KeyCandidate::file("master.key"));
            assert_eq!(key.material().expose_secret(), "abc123");
        });
    }

    #[test]
    fn test_empty_key_file_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("empty.key"), "\n").unwrap();
        let resolver = KeyResolver::new(temp_dir.path());
        assert!(resolver.resolve(&[KeyCandidate::file("empty.key")]).is_none());
    }

    #[test]
    fn test_debug_redacts_material() {
        let key = ResolvedKey {
            source: KeyCandidate::env("master"),
            material: SecretString::new("super-secret".to_string().into()),
        };
        assert!(!format!("{:?}", key).contains("super-secret"));
    }
}
