//! Values held in a configuration tree slot.

use std::sync::Arc;

use serde::{Serialize, Serializer};
use serde_json::Value;

use super::keys::env_override;
use super::node::ConfigNode;

/// One slot of a [`ConfigNode`].
///
/// Nested nodes are shared behind an `Arc`, so values handed out by reads are
/// cheap to clone and never alias mutable state.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    /// A nested mapping.
    Node(Arc<ConfigNode>),
    /// An ordered sequence; each element was cast on its own.
    List(Vec<ConfigValue>),
    /// A bool, number, string or null.
    Scalar(Value),
}

impl ConfigValue {
    /// Builds a slot from a raw value found at `key_path`.
    pub(crate) fn cast(key_path: Vec<String>, value: Value, locked: bool) -> Self {
        match value {
            Value::Object(map) => {
                let mut node = ConfigNode::with_key_path(key_path, locked);
                node.merge(map);
                ConfigValue::Node(Arc::new(node))
            }
            Value::Array(items) => ConfigValue::List(
                items
                    .into_iter()
                    .enumerate()
                    .map(|(index, item)| {
                        let mut element_path = key_path.clone();
                        element_path.push(index.to_string());
                        ConfigValue::cast(element_path, item, locked)
                    })
                    .collect(),
            ),
            scalar => ConfigValue::Scalar(scalar),
        }
    }

    /// Applies environment overrides to the slot found at `key_path`.
    ///
    /// List elements are resolved eagerly against their index paths; nested
    /// nodes resolve their own children lazily on read.
    pub(crate) fn resolve(&self, key_path: &[String]) -> ConfigValue {
        if let Some(value) = env_override(key_path) {
            return ConfigValue::Scalar(Value::String(value));
        }
        match self {
            ConfigValue::List(items) => ConfigValue::List(
                items
                    .iter()
                    .enumerate()
                    .map(|(index, item)| {
                        let mut element_path = key_path.to_vec();
                        element_path.push(index.to_string());
                        item.resolve(&element_path)
                    })
                    .collect(),
            ),
            other => other.clone(),
        }
    }

    pub(crate) fn lock(&mut self) {
        match self {
            ConfigValue::Node(node) => Arc::make_mut(node).lock(),
            ConfigValue::List(items) => items.iter_mut().for_each(ConfigValue::lock),
            ConfigValue::Scalar(_) => {}
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ConfigValue::Scalar(Value::Null))
    }

    /// Whether the value carries anything: `false`, null, blank strings and
    /// empty collections are not present.
    pub fn is_present(&self) -> bool {
        match self {
            ConfigValue::Node(node) => !node.is_empty(),
            ConfigValue::List(items) => !items.is_empty(),
            ConfigValue::Scalar(Value::Null) => false,
            ConfigValue::Scalar(Value::Bool(flag)) => *flag,
            ConfigValue::Scalar(Value::String(s)) => !s.trim().is_empty(),
            ConfigValue::Scalar(_) => true,
        }
    }

    pub fn as_node(&self) -> Option<&ConfigNode> {
        match self {
            ConfigValue::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ConfigValue]> {
        match self {
            ConfigValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            ConfigValue::Scalar(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_scalar().and_then(Value::as_str)
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.as_scalar().and_then(Value::as_bool)
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_scalar().and_then(Value::as_i64)
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.as_scalar().and_then(Value::as_f64)
    }

    /// Materializes the value into plain JSON.
    pub fn to_value(&self) -> Value {
        match self {
            ConfigValue::Node(node) => node.to_value(),
            ConfigValue::List(items) => Value::Array(items.iter().map(Self::to_value).collect()),
            ConfigValue::Scalar(value) => value.clone(),
        }
    }
}

impl PartialEq<Value> for ConfigValue {
    fn eq(&self, other: &Value) -> bool {
        match self {
            ConfigValue::Node(node) => node.as_ref() == other,
            _ => self.to_value() == *other,
        }
    }
}

impl From<ConfigNode> for ConfigValue {
    fn from(node: ConfigNode) -> Self {
        ConfigValue::Node(Arc::new(node))
    }
}

impl Serialize for ConfigValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}
