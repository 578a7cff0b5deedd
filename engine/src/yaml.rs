//! YAML text <-> record conversion.

use serde_json::{Map, Number, Value};
use serde_yaml::Value as YamlValue;

use crate::error::{EngineError, Result};
use crate::record::Record;

/// Render a record as a YAML document, keys in the record's own order.
pub fn record_to_text(record: &Record) -> Result<String> {
    Ok(serde_yaml::to_string(record)?)
}

/// Parse YAML (or JSON) text into plain data.
///
/// Mapping keys that are not strings are stringified and tags are dropped,
/// so the result is always representable as a record value.
pub fn text_to_value(text: &str) -> Result<Value> {
    let parsed: YamlValue =
        serde_yaml::from_str(text).map_err(|e| EngineError::Parse(e.to_string()))?;
    Ok(to_json(parsed))
}

/// Parse text whose root must be a mapping.
pub fn text_to_record(text: &str) -> Result<Record> {
    Record::try_from(text_to_value(text)?)
}

fn to_json(value: YamlValue) -> Value {
    match value {
        YamlValue::Null => Value::Null,
        YamlValue::Bool(b) => Value::Bool(b),
        YamlValue::Number(n) => number_to_json(&n),
        YamlValue::String(s) => Value::String(s),
        YamlValue::Sequence(items) => Value::Array(items.into_iter().map(to_json).collect()),
        YamlValue::Mapping(mapping) => {
            let mut map = Map::with_capacity(mapping.len());
            for (key, value) in mapping {
                map.insert(key_to_string(key), to_json(value));
            }
            Value::Object(map)
        }
        YamlValue::Tagged(tagged) => to_json(tagged.value),
    }
}

fn number_to_json(n: &serde_yaml::Number) -> Value {
    if let Some(i) = n.as_i64() {
        Value::from(i)
    } else if let Some(u) = n.as_u64() {
        Value::from(u)
    } else {
        let f = n.as_f64().unwrap_or(f64::NAN);
        match Number::from_f64(f) {
            Some(number) => Value::Number(number),
            None => {
                tracing::warn!("non-finite number {n} read as null");
                Value::Null
            }
        }
    }
}

fn key_to_string(key: YamlValue) -> String {
    match key {
        YamlValue::String(s) => s,
        YamlValue::Null => "null".to_string(),
        YamlValue::Bool(b) => b.to_string(),
        YamlValue::Number(n) => n.to_string(),
        YamlValue::Tagged(tagged) => key_to_string(tagged.value),
        other => serde_yaml::to_string(&other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}
