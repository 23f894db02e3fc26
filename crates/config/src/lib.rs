//! Layered configuration with environment overrides and encrypted credentials.
//!
//! This crate resolves configuration from JSON/YAML files, environment-keyed
//! sections, encrypted credentials and live environment variables into one
//! locked, read-only tree. Environment variables win at any depth.

pub mod constants;
pub mod credentials;
mod loader;
pub mod tree;

/// Untyped nested structure produced by file and credentials loaders.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

pub use credentials::{CredentialsDecoder, DecryptError, KeyCandidate, KeyResolver};
pub use loader::{
    ConfigBuilder, ConfigError, Environment, FileKey, active_environment, deep_merge,
    env_var_or_none, extract_environmental, file_key_name, is_environment_keyed, load_file,
    parse_json, parse_yaml, read_config_file, resolve_config_file_path, staging_from_env,
};
pub use tree::{ConfigNode, ConfigValue, DefinitionOptions, KeyTransform};
