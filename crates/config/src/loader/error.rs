//! Error types for configuration loading and access.
//!
//! Responsibilities:
//! - Define error variants for every failure surfaced by the tree, the file
//!   loader, and the credentials decoder.
//! - Provide conversion from lower-level crypto errors (`DecryptError`).
//!
//! Does NOT handle:
//! - Deciding whether a failure is fatal (see `ConfigBuilder` strict mode).
//!
//! Invariants:
//! - All error variants include context for debugging (key paths, file paths,
//!   attempted key sources).
//! - Errors never include key material or decrypted plaintext.
//! - Dotenv errors NEVER include raw .env line contents to prevent secret leakage.

use std::io::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;

use crate::credentials::DecryptError;

/// Errors that can occur while building or reading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A file could not be parsed, or its format is not recognized.
    #[error("Failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// No key candidate decrypted a credentials file (strict mode only).
    #[error("Could not decrypt {path} with {}", attempted_sentence(.attempted))]
    Credentials {
        path: PathBuf,
        attempted: Vec<String>,
        #[source]
        source: Option<DecryptError>,
    },

    /// A credentials file could not be produced from a document and key.
    #[error("Could not encrypt credentials for {path}")]
    Encryption {
        path: PathBuf,
        #[source]
        source: DecryptError,
    },

    /// A required value was absent.
    #[error("Could not find configuration value at key path {}", format_key_path(.key_path))]
    KeyMissing { key_path: Vec<String> },

    /// A mutation was attempted on a locked node.
    #[error("Configuration at key path {} is locked and cannot be modified", format_key_path(.key_path))]
    ReadOnly { key_path: Vec<String> },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse the `.env` file due to invalid syntax.
    ///
    /// SAFETY: This error only includes the byte index of the parse failure,
    /// NOT the offending line content, to prevent leaking secrets.
    #[error(
        "Failed to parse .env file at position {error_index}. Hint: set DOTENV_DISABLED=1 to skip .env loading"
    )]
    DotenvParse { error_index: usize },

    /// Failed to read the `.env` file due to an I/O error.
    #[error("Failed to read .env file: {kind}")]
    DotenvIo { kind: ErrorKind },

    /// Unknown dotenv error (future variants from dotenvy crate).
    #[error("Failed to load .env file. Hint: set DOTENV_DISABLED=1 to skip .env loading")]
    DotenvUnknown,
}

impl ConfigError {
    pub(crate) fn parse(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        ConfigError::Parse {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

fn format_key_path(key_path: &[String]) -> String {
    let quoted: Vec<String> = key_path.iter().map(|key| format!("{:?}", key)).collect();
    format!("[{}]", quoted.join(", "))
}

/// Joins attempted sources into `a`, `a or b`, or `a, b, or c`.
fn attempted_sentence(attempted: &[String]) -> String {
    match attempted {
        [] => "no key sources".to_string(),
        [only] => only.clone(),
        [first, second] => format!("{} or {}", first, second),
        [rest @ .., last] => format!("{}, or {}", rest.join(", "), last),
    }
}
