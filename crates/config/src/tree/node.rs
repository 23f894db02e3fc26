//! The hierarchical configuration node.
//!
//! Responsibilities:
//! - Deep-merge raw records into a tree of nodes, lists and scalars.
//! - Track the key path of every node from the root.
//! - Resolve environment-variable overrides lazily, at read and
//!   materialization time.
//! - Refuse mutation once locked.
//!
//! Does NOT handle:
//! - Parsing files or credentials (see `loader` and `credentials`).
//! - Environment-keyed section extraction (see `loader::file`).
//!
//! Invariants:
//! - A node's key path is its parent's key path plus the key it was created
//!   under, and never changes.
//! - Once locked, a node and every descendant reject mutation; nodes created
//!   from a locked node start locked.
//! - An override is always a string, whatever the configured type.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use super::keys::{env_override, normalize_key, split_segments};
use super::value::ConfigValue;
use crate::loader::ConfigError;
use crate::RawRecord;

/// One level of nested configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigNode {
    key_path: Vec<String>,
    children: BTreeMap<String, ConfigValue>,
    locked: bool,
}

impl ConfigNode {
    /// Creates an empty, unlocked root node.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an unlocked root node seeded with `record`.
    pub fn from_record(record: RawRecord) -> Self {
        let mut node = Self::new();
        node.merge(record);
        node
    }

    pub(crate) fn with_key_path(key_path: Vec<String>, locked: bool) -> Self {
        Self {
            key_path,
            children: BTreeMap::new(),
            locked,
        }
    }

    pub fn key_path(&self) -> &[String] {
        &self.key_path
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Normalized keys of the direct children.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.children.keys().map(String::as_str)
    }

    /// Direct children with overrides applied.
    pub fn iter(&self) -> impl Iterator<Item = (&str, ConfigValue)> + '_ {
        self.children
            .iter()
            .map(|(key, value)| (key.as_str(), value.resolve(&self.child_path(key))))
    }

    /// Deep-merges `record` into this node.
    ///
    /// Mappings merge into existing child nodes (later leaves win, nested keys
    /// recurse); lists and scalars replace whatever was there.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ReadOnly` if the node is locked.
    pub fn append(&mut self, record: RawRecord) -> Result<(), ConfigError> {
        self.ensure_unlocked()?;
        self.merge(record);
        Ok(())
    }

    /// Writes a single value, replacing anything stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ReadOnly` if the node is locked.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<(), ConfigError> {
        self.ensure_unlocked()?;
        let key = normalize_key(key);
        let slot = ConfigValue::cast(self.child_path(&key), value.into(), self.locked);
        self.children.insert(key, slot);
        Ok(())
    }

    pub(crate) fn merge(&mut self, record: Map<String, Value>) {
        let mut seen: HashMap<String, String> = HashMap::new();
        for (raw_key, value) in record {
            let key = normalize_key(&raw_key);
            if let Some(previous) = seen.insert(key.clone(), raw_key.clone()) {
                tracing::warn!(
                    key_path = ?self.child_path(&key),
                    first = %previous,
                    second = %raw_key,
                    "Keys normalize to the same name, later value wins"
                );
            }
            match value {
                Value::Object(map) => {
                    if let Some(ConfigValue::Node(existing)) = self.children.get_mut(&key) {
                        Arc::make_mut(existing).merge(map);
                        continue;
                    }
                    let mut child = ConfigNode::with_key_path(self.child_path(&key), self.locked);
                    child.merge(map);
                    self.children.insert(key, child.into());
                }
                other => {
                    let slot = ConfigValue::cast(self.child_path(&key), other, self.locked);
                    self.children.insert(key, slot);
                }
            }
        }
    }

    /// Locks this node and every descendant. Idempotent.
    pub fn lock(&mut self) {
        self.locked = true;
        self.children.values_mut().for_each(ConfigValue::lock);
    }

    /// Looks up the value at `path`.
    ///
    /// Segments may contain `.` separators. Navigation stops with `None` as
    /// soon as a segment lands on something that is not a node or list. The
    /// override for the full key path is checked before the configured value.
    /// Null values read as absent.
    pub fn read<I, S>(&self, path: I) -> Option<ConfigValue>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let segments = split_segments(path);
        self.read_segments(&segments)
    }

    /// Like [`read`](Self::read), returning `fallback()` when nothing resolves.
    pub fn read_or_else<I, S, F>(&self, path: I, fallback: F) -> ConfigValue
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: FnOnce() -> ConfigValue,
    {
        self.read(path).unwrap_or_else(fallback)
    }

    /// Like [`read`](Self::read), failing when nothing resolves.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::KeyMissing` naming the full attempted key path.
    pub fn read_required<I, S>(&self, path: I) -> Result<ConfigValue, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let segments = split_segments(path);
        self.read_segments(&segments)
            .ok_or_else(|| ConfigError::KeyMissing {
                key_path: self.extend_path(&segments),
            })
    }

    /// Like [`read`](Self::read), returning an empty node carrying the
    /// attempted key path when nothing resolves.
    pub fn read_safe<I, S>(&self, path: I) -> ConfigValue
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let segments = split_segments(path);
        self.read_segments(&segments).unwrap_or_else(|| {
            ConfigNode::with_key_path(self.extend_path(&segments), self.locked).into()
        })
    }

    /// Whether `path` resolves to a present (non-blank) value.
    pub fn is_present<I, S>(&self, path: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.read(path).is_some_and(|value| value.is_present())
    }

    fn read_segments(&self, segments: &[String]) -> Option<ConfigValue> {
        let key_path = self.extend_path(segments);
        if segments.is_empty() {
            return Some(self.clone().into());
        }
        if let Some(value) = env_override(&key_path) {
            return Some(ConfigValue::Scalar(Value::String(value)));
        }

        let (first, rest) = segments.split_first()?;
        let mut current = self.children.get(first)?;
        for segment in rest {
            current = match current {
                ConfigValue::Node(node) => node.children.get(segment)?,
                ConfigValue::List(items) => items.get(list_index(segment)?)?,
                ConfigValue::Scalar(_) => return None,
            };
        }

        let resolved = current.resolve(&key_path);
        if resolved.is_null() { None } else { Some(resolved) }
    }

    /// Materializes the subtree as plain JSON with overrides applied.
    pub fn to_value(&self) -> Value {
        let object: Map<String, Value> = self
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_value()))
            .collect();
        Value::Object(object)
    }

    fn ensure_unlocked(&self) -> Result<(), ConfigError> {
        if self.locked {
            return Err(ConfigError::ReadOnly {
                key_path: self.key_path.clone(),
            });
        }
        Ok(())
    }

    fn child_path(&self, key: &str) -> Vec<String> {
        let mut path = self.key_path.clone();
        path.push(key.to_string());
        path
    }

    fn extend_path(&self, segments: &[String]) -> Vec<String> {
        let mut path = self.key_path.clone();
        path.extend(segments.iter().cloned());
        path
    }
}

impl PartialEq for ConfigNode {
    fn eq(&self, other: &Self) -> bool {
        self.to_value() == other.to_value()
    }
}

impl PartialEq<Value> for ConfigNode {
    fn eq(&self, other: &Value) -> bool {
        self.to_value() == normalize_keys(other)
    }
}

impl Serialize for ConfigNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

/// Parses a list index segment. Only the canonical spelling is accepted
/// (`1`, never `01` or `+1`), so a read path always names the same override
/// variable as the element it lands on.
fn list_index(segment: &str) -> Option<usize> {
    segment
        .parse::<usize>()
        .ok()
        .filter(|index| index.to_string() == segment)
}

/// Rewrites every object key of a plain value to the tree's key convention.
fn normalize_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, value)| (normalize_key(key), normalize_keys(value)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(normalize_keys).collect()),
        other => other.clone(),
    }
}
