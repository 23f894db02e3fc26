//! Configuration builder implementation.
//!
//! Responsibilities:
//! - Provide a builder-pattern `ConfigBuilder` that layers configuration
//!   files, environment-keyed sections and encrypted credentials into one
//!   tree.
//! - Apply the strict/non-strict failure policy to every source.
//! - Lock the finished tree.
//!
//! Does NOT handle:
//! - Tree semantics: merging, overrides, locking (see `tree`).
//! - Decryption (see `credentials`).
//! - Discovering which files exist (callers pass paths or names).
//!
//! Invariants / Assumptions:
//! - Sources apply strictly in call order; later sources win on conflicting
//!   leaves.
//! - Environment variables take precedence over every source at read time.
//! - `build()` consumes the builder; the returned tree is locked.
//! - The `DOTENV_DISABLED` variable is checked before any `.env` is read.

use std::path::{Path, PathBuf};

use serde_json::Value;

use super::env::{active_environment, staging_from_env};
use super::error::ConfigError;
use super::file::{self, Environment, FileKey, extract_environmental};
use super::path::resolve_config_file_path;
use crate::RawRecord;
use crate::constants::{
    CONFIG_EXTENSIONS, CREDENTIALS_EXTENSION, DEFAULT_ENVIRONMENT, DOTENV_DISABLED_VAR,
    KEY_EXTENSION, STAGING_KEY,
};
use crate::credentials::{CredentialsDecoder, KeyCandidate, KeyResolver};
use crate::tree::ConfigNode;

/// Builds a locked [`ConfigNode`] from layered sources.
#[derive(Debug)]
pub struct ConfigBuilder {
    root: ConfigNode,
    project_root: PathBuf,
    environment: String,
    staging: bool,
    strict: bool,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigBuilder {
    /// Create a new builder rooted at the current directory, for the
    /// `development` environment, in non-strict mode.
    pub fn new() -> Self {
        Self {
            root: ConfigNode::new(),
            project_root: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            environment: DEFAULT_ENVIRONMENT.to_string(),
            staging: false,
            strict: false,
        }
    }

    /// Read the active environment from `APP_ENV`.
    pub fn from_env(mut self) -> Self {
        self.environment = active_environment();
        self
    }

    /// Set the active environment name.
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    /// Set the directory relative paths and bare names resolve against.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.project_root = root.into();
        self
    }

    /// Fail on unreadable files and undecryptable credentials instead of
    /// skipping them.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Whether the staging sections and credentials apply.
    pub fn is_staging(&self) -> bool {
        self.staging
    }

    /// The tree built so far.
    pub fn config(&self) -> &ConfigNode {
        &self.root
    }

    fn current_environment(&self) -> Environment {
        Environment::new(self.environment.clone(), self.staging)
    }

    /// Check if dotenv loading is disabled via environment variable.
    fn dotenv_disabled() -> bool {
        matches!(
            std::env::var(DOTENV_DISABLED_VAR).ok().as_deref(),
            Some("true") | Some("1")
        )
    }

    /// Load environment variables from `.env` in the project root, if present.
    ///
    /// If `DOTENV_DISABLED` is set to "true" or "1", the file is not read.
    /// Variables already set in the process are not replaced.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The `.env` file exists but has invalid syntax (`ConfigError::DotenvParse`)
    /// - The `.env` file exists but cannot be read due to I/O errors (`ConfigError::DotenvIo`)
    ///
    /// Missing `.env` files are silently ignored (returns `Ok(self)`).
    ///
    /// SAFETY: Error messages never include raw .env line contents to prevent secret leakage.
    pub fn load_dotenv(self) -> Result<Self, ConfigError> {
        if Self::dotenv_disabled() {
            return Ok(self);
        }

        match dotenvy::from_path(self.project_root.join(".env")) {
            Ok(()) => Ok(self),
            Err(e) if Self::is_not_found(&e) => Ok(self),
            Err(dotenvy::Error::LineParse(_, idx)) => {
                Err(ConfigError::DotenvParse { error_index: idx })
            }
            Err(dotenvy::Error::Io(io_err)) => Err(ConfigError::DotenvIo {
                kind: io_err.kind(),
            }),
            Err(_) => Err(ConfigError::DotenvUnknown),
        }
    }

    /// Check if a dotenv error indicates the file was not found.
    fn is_not_found(err: &dotenvy::Error) -> bool {
        matches!(
            err,
            dotenvy::Error::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound
        )
    }

    /// Record whether this deployment is staging.
    ///
    /// With `None` the flag is inferred: the environment is `production` and
    /// `STAGING` is set. The flag is stored under `staging` and selects the
    /// `staging` section of environment-keyed files loaded afterwards.
    pub fn add_staging_flag(mut self, staging: Option<bool>) -> Result<Self, ConfigError> {
        let staging = staging.unwrap_or_else(|| staging_from_env(&self.environment));
        self.root.set(STAGING_KEY, staging)?;
        self.staging = staging;
        Ok(self)
    }

    /// Assign a single value directly.
    pub fn set(mut self, key: &str, value: impl Into<Value>) -> Result<Self, ConfigError> {
        self.root.set(key, value)?;
        Ok(self)
    }

    /// Merge a raw record, collapsing it first if it is environment-keyed.
    pub fn load_record(mut self, record: RawRecord) -> Result<Self, ConfigError> {
        let record = extract_environmental(record, &self.current_environment());
        self.root.append(record)?;
        Ok(self)
    }

    /// Load a configuration file keyed by its name.
    ///
    /// `path` may be a bare name (`database`), resolved under `config/` with
    /// the extension guessed, or a relative or absolute path.
    pub fn load_file(self, path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        self.load_file_with_key(path, FileKey::Auto)
    }

    /// Load a configuration file placed per `key`.
    ///
    /// # Errors
    ///
    /// In strict mode, returns the read or parse error. Otherwise the file is
    /// skipped with a warning.
    pub fn load_file_with_key(
        mut self,
        path: impl AsRef<Path>,
        key: FileKey,
    ) -> Result<Self, ConfigError> {
        let path = resolve_config_file_path(&self.project_root, path, CONFIG_EXTENSIONS);
        match file::load_file(&path, &self.current_environment(), &key) {
            Ok(record) => {
                self.root.append(record)?;
                tracing::debug!(path = %path.display(), "Loaded configuration file");
                Ok(self)
            }
            Err(e) if self.strict => Err(e),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Could not load config file, skipping"
                );
                Ok(self)
            }
        }
    }

    /// Decrypt a credentials file with the first working key candidate and
    /// merge it.
    ///
    /// `path` resolves like [`load_file`](Self::load_file), with the
    /// `yml.enc` extension. Relative key files resolve against the project
    /// root.
    pub fn load_credentials(
        mut self,
        path: impl AsRef<Path>,
        candidates: &[KeyCandidate],
    ) -> Result<Self, ConfigError> {
        let path = resolve_config_file_path(&self.project_root, path, &[CREDENTIALS_EXTENSION]);
        let record = self.decoder().load(&path, candidates)?;
        self.root.append(record)?;
        Ok(self)
    }

    /// Load the conventional credentials files, each layered on the last:
    ///
    /// | File | Keys tried |
    /// |------|------------|
    /// | `config/credentials.yml.enc` | `RAILS_MASTER_KEY`, `RAILS_ROOT_KEY`, `config/master.key` |
    /// | `config/credentials/<env>.yml.enc` | `RAILS_<ENV>_KEY`, `RAILS_MASTER_KEY`, `config/credentials/<env>.key` |
    /// | `config/credentials/staging.yml.enc` (staging only) | `RAILS_STAGING_KEY`, `RAILS_MASTER_KEY`, `config/credentials/staging.key` |
    pub fn load_default_credentials(self) -> Result<Self, ConfigError> {
        let root_candidates = [
            KeyCandidate::env("master"),
            KeyCandidate::env("root"),
            KeyCandidate::file(format!("config/master.{}", KEY_EXTENSION)),
        ];
        let mut builder = self.load_credentials("credentials", &root_candidates)?;

        let environment = builder.environment.clone();
        builder = builder.load_credentials(
            format!("config/credentials/{}", environment),
            &Self::layer_candidates(&environment),
        )?;

        if builder.is_staging() {
            builder = builder.load_credentials(
                format!("config/credentials/{}", STAGING_KEY),
                &Self::layer_candidates(STAGING_KEY),
            )?;
        }
        Ok(builder)
    }

    fn layer_candidates(name: &str) -> [KeyCandidate; 3] {
        [
            KeyCandidate::env(name),
            KeyCandidate::env("master"),
            KeyCandidate::file(format!("config/credentials/{}.{}", name, KEY_EXTENSION)),
        ]
    }

    fn decoder(&self) -> CredentialsDecoder {
        CredentialsDecoder::new(KeyResolver::new(&self.project_root)).with_strict(self.strict)
    }

    /// Lock the tree and hand it over.
    pub fn build(mut self) -> ConfigNode {
        self.root.lock();
        tracing::debug!(
            environment = %self.environment,
            keys = self.root.len(),
            "Configuration built"
        );
        self.root
    }
}
