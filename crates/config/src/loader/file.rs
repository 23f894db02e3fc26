//! Configuration file loading.
//!
//! Responsibilities:
//! - Parse JSON and YAML configuration files into raw records.
//! - Collapse environment-keyed files (`shared`, `production`, ...) into the
//!   sections that apply to the active environment.
//! - Key the result by file name, an explicit key, or not at all.
//!
//! Does NOT handle:
//! - Finding files (callers pass paths; see `path.rs` for name resolution).
//! - Merging into the tree (see `ConfigBuilder`).
//!
//! Invariants:
//! - A file is environment-keyed only if it is non-empty and every top-level
//!   key is a known environment section.
//! - Environment sections merge as shared < environment < staging, each
//!   optional.

use std::path::Path;

use serde_json::Value;

use super::error::ConfigError;
use super::parse::{parse_json, parse_yaml};
use crate::RawRecord;
use crate::constants::{CONFIG_DIR, ENVIRONMENT_SECTIONS, SHARED_SECTION, STAGING_KEY};

/// The environment a file is being loaded for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    pub name: String,
    pub staging: bool,
}

impl Environment {
    pub fn new(name: impl Into<String>, staging: bool) -> Self {
        Self {
            name: name.into(),
            staging,
        }
    }

    /// Sections to merge from an environment-keyed record, lowest precedence first.
    fn sections(&self) -> Vec<&str> {
        let mut sections = vec![SHARED_SECTION, self.name.as_str()];
        if self.staging {
            sections.push(STAGING_KEY);
        }
        sections
    }
}

/// How a loaded file is placed in the tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FileKey {
    /// Under the file's base name; `config.*` files use their directory name.
    #[default]
    Auto,
    /// Under an explicit key.
    Named(String),
    /// Merged at the root.
    Unkeyed,
}

/// Parses the file at `path` according to its extension.
///
/// # Errors
///
/// - `ConfigError::Parse` for unknown extensions or invalid contents.
/// - `ConfigError::Io` when the file cannot be read.
pub fn read_config_file(path: &Path) -> Result<RawRecord, ConfigError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "json" => {
            let contents = std::fs::read_to_string(path)?;
            parse_json(&contents).map_err(|e| ConfigError::parse(path, e))
        }
        "yml" | "yaml" => {
            let contents = std::fs::read_to_string(path)?;
            parse_yaml(&contents).map_err(|e| ConfigError::parse(path, e))
        }
        _ => Err(ConfigError::parse(path, "unrecognized configuration file format")),
    }
}

/// Loads a configuration file, extracts the sections for `environment`, and
/// keys the result per `key`.
pub fn load_file(
    path: &Path,
    environment: &Environment,
    key: &FileKey,
) -> Result<RawRecord, ConfigError> {
    let config = extract_environmental(read_config_file(path)?, environment);

    let name = match key {
        FileKey::Unkeyed => return Ok(config),
        FileKey::Named(name) => name.clone(),
        FileKey::Auto => file_key_name(path)
            .ok_or_else(|| ConfigError::parse(path, "cannot derive a key from the file name"))?,
    };

    let mut keyed = RawRecord::new();
    keyed.insert(name, Value::Object(config));
    Ok(keyed)
}

/// Key a file contributes under: its stem, or its directory's name for
/// `config.*` files.
pub fn file_key_name(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    if stem.eq_ignore_ascii_case(CONFIG_DIR) {
        return path
            .parent()?
            .file_name()?
            .to_str()
            .map(ToString::to_string);
    }
    Some(stem.to_string())
}

/// Whether every top-level key of a non-empty record names an environment.
pub fn is_environment_keyed(record: &RawRecord) -> bool {
    !record.is_empty()
        && record
            .keys()
            .all(|key| ENVIRONMENT_SECTIONS.contains(&key.as_str()))
}

/// Collapses an environment-keyed record into the sections that apply;
/// other records are returned untouched.
pub fn extract_environmental(record: RawRecord, environment: &Environment) -> RawRecord {
    if !is_environment_keyed(&record) {
        return record;
    }

    let mut merged = RawRecord::new();
    for section in environment.sections() {
        if let Some(Value::Object(layer)) = record.get(section) {
            deep_merge(&mut merged, layer.clone());
        }
    }
    merged
}

/// Merges `overlay` into `base`: nested mappings recurse, anything else in
/// `overlay` replaces what `base` had.
pub fn deep_merge(base: &mut RawRecord, overlay: RawRecord) {
    for (key, value) in overlay {
        match value {
            Value::Object(nested) => {
                if let Some(Value::Object(existing)) = base.get_mut(&key) {
                    deep_merge(existing, nested);
                } else {
                    base.insert(key, Value::Object(nested));
                }
            }
            value => {
                base.insert(key, value);
            }
        }
    }
}
