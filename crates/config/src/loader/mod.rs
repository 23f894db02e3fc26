//! Configuration loading from files, credentials and the environment.
//!
//! Responsibilities:
//! - Parse JSON/YAML files and collapse environment-keyed sections.
//! - Provide the builder-pattern `ConfigBuilder` for layering sources.
//! - Enforce the `DOTENV_DISABLED` gate before reading `.env`.
//!
//! Does NOT handle:
//! - Tree semantics (see `tree`).
//! - Decryption internals (see `credentials`).
//!
//! Invariants / Assumptions:
//! - Environment variables take precedence over every loaded source.
//! - `load_dotenv()` must be called explicitly to enable `.env` file loading.

mod builder;
mod env;
mod error;
mod file;
mod parse;
mod path;

#[cfg(test)]
mod tests;

pub use builder::ConfigBuilder;
pub use env::{active_environment, env_var_or_none, staging_from_env};
pub use error::ConfigError;
pub use file::{
    Environment, FileKey, deep_merge, extract_environmental, file_key_name, is_environment_keyed,
    load_file, read_config_file,
};
pub use parse::{parse_json, parse_yaml};
pub use path::resolve_config_file_path;
