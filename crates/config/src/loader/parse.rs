//! Text parsers producing raw records.
//!
//! Thin adapters over `serde_json` and `serde_yaml`. A document whose top
//! level is not a mapping (empty file, bare scalar, list) yields an empty
//! record.

use serde_json::{Map, Number, Value};
use serde_yaml::Value as YamlValue;

use crate::RawRecord;

/// Parses a JSON document into a raw record.
pub fn parse_json(text: &str) -> Result<RawRecord, serde_json::Error> {
    match serde_json::from_str::<Value>(text)? {
        Value::Object(map) => Ok(map),
        _ => Ok(RawRecord::new()),
    }
}

/// Parses a YAML document into a raw record, applying `<<` merge keys.
pub fn parse_yaml(text: &str) -> Result<RawRecord, serde_yaml::Error> {
    let mut document: YamlValue = serde_yaml::from_str(text)?;
    document.apply_merge()?;
    match yaml_to_json(document) {
        Value::Object(map) => Ok(map),
        _ => Ok(RawRecord::new()),
    }
}

fn yaml_to_json(value: YamlValue) -> Value {
    match value {
        YamlValue::Null => Value::Null,
        YamlValue::Bool(b) => Value::Bool(b),
        YamlValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                n.as_f64()
                    .and_then(Number::from_f64)
                    .map_or(Value::Null, Value::Number)
            }
        }
        YamlValue::String(s) => Value::String(s),
        YamlValue::Sequence(items) => Value::Array(items.into_iter().map(yaml_to_json).collect()),
        YamlValue::Mapping(mapping) => {
            let map: Map<String, Value> = mapping
                .into_iter()
                .map(|(key, value)| (yaml_key(key), yaml_to_json(value)))
                .collect();
            Value::Object(map)
        }
        YamlValue::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

/// Renders a non-string mapping key (`1:`, `true:`) as text.
fn yaml_key(key: YamlValue) -> String {
    match key {
        YamlValue::String(s) => s,
        YamlValue::Null => "null".to_string(),
        YamlValue::Bool(b) => b.to_string(),
        YamlValue::Number(n) => n.to_string(),
        other => serde_yaml::to_string(&other)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    }
}
