//! Flattening a tree into key-path definitions.
//!
//! Produces `KEY_PATH => json(value)` pairs, suitable for injecting the
//! configuration as build-time constants or environment definitions.

use std::collections::BTreeMap;

use heck::ToShoutySnakeCase;
use serde_json::Value;

use super::node::ConfigNode;

/// How each key path segment is rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyTransform {
    /// `other_thing` becomes `OTHER_THING`.
    #[default]
    ShoutySnake,
    /// Segments are used as stored.
    Verbatim,
}

/// Options for [`ConfigNode::definitions`].
#[derive(Debug, Clone)]
pub struct DefinitionOptions {
    /// Prepended verbatim to every flattened key.
    pub prefix: Option<String>,
    /// Joins key path segments.
    pub separator: String,
    pub key_transform: KeyTransform,
}

impl Default for DefinitionOptions {
    fn default() -> Self {
        Self {
            prefix: None,
            separator: "_".to_string(),
            key_transform: KeyTransform::default(),
        }
    }
}

impl ConfigNode {
    /// Flattens the tree into one entry per leaf, with overrides applied.
    ///
    /// Lists are leaves; their value is the JSON encoding of the whole list.
    pub fn definitions(&self, options: &DefinitionOptions) -> BTreeMap<String, String> {
        let mut definitions = BTreeMap::new();
        let mut segments = Vec::new();
        if let Value::Object(map) = self.to_value() {
            flatten(&map, options, &mut segments, &mut definitions);
        }
        definitions
    }
}

fn flatten(
    map: &serde_json::Map<String, Value>,
    options: &DefinitionOptions,
    segments: &mut Vec<String>,
    definitions: &mut BTreeMap<String, String>,
) {
    for (key, value) in map {
        segments.push(match options.key_transform {
            KeyTransform::ShoutySnake => key.to_shouty_snake_case(),
            KeyTransform::Verbatim => key.clone(),
        });
        match value {
            Value::Object(nested) => flatten(nested, options, segments, definitions),
            leaf => {
                let mut name = segments.join(&options.separator);
                if let Some(prefix) = &options.prefix {
                    name.insert_str(0, prefix);
                }
                definitions.insert(name, leaf.to_string());
            }
        }
        segments.pop();
    }
}
