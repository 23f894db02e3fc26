//! Environment variable helpers for configuration loading.
//!
//! Responsibilities:
//! - Read environment variables with empty/whitespace filtering.
//! - Determine the active environment name and the staging flag.
//!
//! Does NOT handle:
//! - Per-key overrides of tree values (see `tree::keys`), which honour any
//!   set variable, empty or not.
//! - .env file loading (handled by `ConfigBuilder::load_dotenv`).
//!
//! Invariants:
//! - Empty or whitespace-only environment variables are treated as unset.
//! - Returned values are trimmed (leading/trailing whitespace removed).

use crate::constants::{DEFAULT_ENVIRONMENT, ENVIRONMENT_VAR, STAGING_VAR};

/// Read an environment variable, returning None if unset, empty, or whitespace-only.
/// Returns the trimmed value (leading/trailing whitespace removed) if present.
pub fn env_var_or_none(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == s.len() {
            // No trimming needed, return original to avoid allocation
            Some(s)
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// The active environment: `APP_ENV`, or `development` when unset.
pub fn active_environment() -> String {
    env_var_or_none(ENVIRONMENT_VAR).unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string())
}

/// Whether the deployment should be treated as staging: running `production`
/// with `STAGING` set.
pub fn staging_from_env(environment: &str) -> bool {
    environment == "production" && env_var_or_none(STAGING_VAR).is_some()
}
