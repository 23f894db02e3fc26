//! Centralized constants for configuration loading.
//!
//! This module contains names and defaults shared by the tree, the
//! credentials decoder, and the builder.

// =============================================================================
// Environment
// =============================================================================

/// Environment variable naming the active environment.
pub const ENVIRONMENT_VAR: &str = "APP_ENV";

/// Environment assumed when `APP_ENV` is unset or blank.
pub const DEFAULT_ENVIRONMENT: &str = "development";

/// Environment variable marking a production deployment as staging.
pub const STAGING_VAR: &str = "STAGING";

/// Tree key under which the staging flag is stored.
pub const STAGING_KEY: &str = "staging";

/// Section names that mark a file as keyed by environment.
pub const ENVIRONMENT_SECTIONS: &[&str] = &[
    "default",
    "development",
    "production",
    "shared",
    "staging",
    "test",
];

/// Section merged beneath every environment-specific section.
pub const SHARED_SECTION: &str = "shared";

/// Environment variable that disables `.env` loading when set to `1` or `true`.
pub const DOTENV_DISABLED_VAR: &str = "DOTENV_DISABLED";

// =============================================================================
// Files
// =============================================================================

/// Directory bare configuration names are resolved under.
pub const CONFIG_DIR: &str = "config";

/// Extensions tried, in order, for configuration files given without one.
pub const CONFIG_EXTENSIONS: &[&str] = &["json", "yml", "yaml"];

/// Extension of encrypted credentials files.
pub const CREDENTIALS_EXTENSION: &str = "yml.enc";

/// Extension of key files.
pub const KEY_EXTENSION: &str = "key";

// =============================================================================
// Credentials
// =============================================================================

/// Prefix of environment variables that already follow the key naming convention.
pub const SECRET_KEY_PREFIX: &str = "RAILS_";

/// Suffix appended when rewriting a short key name to the naming convention.
pub const SECRET_KEY_SUFFIX: &str = "_KEY";

/// Separator between the base64 fields of a credentials envelope.
pub const ENVELOPE_SEPARATOR: &str = "--";

/// Key length for AES-128-GCM in bytes.
pub const KEY_LEN: usize = 16;

/// Initialization vector length in bytes.
pub const IV_LEN: usize = 12;

/// Authentication tag length in bytes.
pub const AUTH_TAG_LEN: usize = 16;

// =============================================================================
// Tree
// =============================================================================

/// Separator accepted inside a single read segment (`"a.b"` is `"a", "b"`).
pub const PATH_SEPARATOR: char = '.';

/// Separator used to join a key path into an override variable name.
pub const ENV_KEY_SEPARATOR: &str = "_";
