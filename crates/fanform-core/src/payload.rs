//! Nested attribute payloads.
//!
//! A payload item is decided at the boundary: either an already-built
//! [`Record`] or an [`AttributeMap`]. Nothing downstream inspects an item
//! to guess which one it is.

use crate::{ID_FIELD, record::Record, value::Value};
use derive_more::{Deref, DerefMut};
use std::collections::BTreeMap;
use thiserror::Error as ThisError;

///
/// PayloadError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum PayloadError {
    #[error("invalid payload shape at '{path}': expected {expected}, found {actual}")]
    InvalidShape {
        path: String,
        expected: &'static str,
        actual: &'static str,
    },
}

///
/// Payload
///

#[derive(Clone, Debug)]
pub enum Payload {
    Record(Record),
    Attributes(AttributeMap),
}

impl Payload {
    /// Parse one JSON document into payload items.
    ///
    /// An object yields one item, an array yields one item per element and
    /// null yields none.
    pub fn from_json(json: &serde_json::Value) -> Result<Vec<Self>, PayloadError> {
        parse_items(json, "")
    }

    #[must_use]
    pub const fn as_attributes(&self) -> Option<&AttributeMap> {
        match self {
            Self::Attributes(map) => Some(map),
            Self::Record(_) => None,
        }
    }
}

impl From<Record> for Payload {
    fn from(record: Record) -> Self {
        Self::Record(record)
    }
}

impl From<AttributeMap> for Payload {
    fn from(map: AttributeMap) -> Self {
        Self::Attributes(map)
    }
}

///
/// PayloadValue
///

#[derive(Clone, Debug)]
pub enum PayloadValue {
    Scalar(Value),
    Nested(Vec<Payload>),
}

///
/// AttributeMap
///
/// Attribute name → value mapping for one payload item.
///

#[derive(Clone, Debug, Default, Deref, DerefMut)]
pub struct AttributeMap(BTreeMap<String, PayloadValue>);

impl AttributeMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add a scalar attribute.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0
            .insert(key.into(), PayloadValue::Scalar(value.into()));
        self
    }

    /// Builder: add a nested association payload.
    #[must_use]
    pub fn with_nested(mut self, key: impl Into<String>, items: Vec<Payload>) -> Self {
        self.0.insert(key.into(), PayloadValue::Nested(items));
        self
    }

    /// Scalar value under `key`, if present and scalar.
    #[must_use]
    pub fn scalar(&self, key: &str) -> Option<&Value> {
        match self.0.get(key) {
            Some(PayloadValue::Scalar(value)) => Some(value),
            _ => None,
        }
    }

    /// The `id` scalar, when present and not blank.
    #[must_use]
    pub fn id_value(&self) -> Option<&Value> {
        self.scalar(ID_FIELD).filter(|value| !value.is_blank())
    }

    /// Parse a JSON object into an attribute map.
    pub fn from_json(json: &serde_json::Value) -> Result<Self, PayloadError> {
        match json {
            serde_json::Value::Object(_) => parse_map(json, ""),
            other => Err(shape_error("", "object", other)),
        }
    }
}

impl IntoIterator for AttributeMap {
    type Item = (String, PayloadValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, PayloadValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl From<BTreeMap<String, Value>> for AttributeMap {
    fn from(values: BTreeMap<String, Value>) -> Self {
        Self(
            values
                .into_iter()
                .map(|(k, v)| (k, PayloadValue::Scalar(v)))
                .collect(),
        )
    }
}

// ----------------------------------------------------------------------
// JSON parsing
// ----------------------------------------------------------------------

fn parse_items(json: &serde_json::Value, path: &str) -> Result<Vec<Payload>, PayloadError> {
    match json {
        serde_json::Value::Null => Ok(Vec::new()),
        serde_json::Value::Object(_) => Ok(vec![Payload::Attributes(parse_map(json, path)?)]),
        serde_json::Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let item_path = format!("{path}[{index}]");
                match item {
                    serde_json::Value::Object(_) => {
                        parse_map(item, &item_path).map(Payload::Attributes)
                    }
                    other => Err(shape_error(&item_path, "object", other)),
                }
            })
            .collect(),
        other => Err(shape_error(path, "object or array", other)),
    }
}

fn parse_map(json: &serde_json::Value, path: &str) -> Result<AttributeMap, PayloadError> {
    let serde_json::Value::Object(entries) = json else {
        return Err(shape_error(path, "object", json));
    };

    let mut map = AttributeMap::new();
    for (key, value) in entries {
        let key_path = if path.is_empty() {
            key.clone()
        } else {
            format!("{path}.{key}")
        };

        let entry = match Value::from_json(value) {
            Some(scalar) => PayloadValue::Scalar(scalar),
            None => PayloadValue::Nested(parse_items(value, &key_path)?),
        };
        map.insert(key.clone(), entry);
    }

    Ok(map)
}

const fn json_kind(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

fn shape_error(path: &str, expected: &'static str, actual: &serde_json::Value) -> PayloadError {
    PayloadError::InvalidShape {
        path: if path.is_empty() {
            "<root>".to_string()
        } else {
            path.to_string()
        },
        expected,
        actual: json_kind(actual),
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn object_array_and_null_roots() {
        assert_eq!(
            Payload::from_json(&json!({"name": "a"}))
                .expect("object should parse")
                .len(),
            1
        );
        assert_eq!(
            Payload::from_json(&json!([{"name": "a"}, {"name": "b"}]))
                .expect("array should parse")
                .len(),
            2
        );
        assert!(
            Payload::from_json(&json!(null))
                .expect("null should parse")
                .is_empty()
        );
    }

    #[test]
    fn nested_objects_become_nested_payloads() {
        let items = Payload::from_json(&json!({
            "name": "Colour",
            "options": [{"name": "Red"}, {"name": "Blue"}],
            "detail": {"name": "one"}
        }))
        .expect("payload should parse");

        let map = items[0].as_attributes().expect("attributes expected");
        assert_eq!(map.scalar("name"), Some(&Value::from("Colour")));
        assert!(matches!(map.get("options"), Some(PayloadValue::Nested(v)) if v.len() == 2));
        assert!(matches!(map.get("detail"), Some(PayloadValue::Nested(v)) if v.len() == 1));
    }

    #[test]
    fn scalar_root_and_scalar_array_items_are_rejected() {
        let err = Payload::from_json(&json!("oops")).expect_err("string root should fail");
        assert_eq!(
            err,
            PayloadError::InvalidShape {
                path: "<root>".to_string(),
                expected: "object or array",
                actual: "string",
            }
        );

        let err = Payload::from_json(&json!({"options": [1, 2]}))
            .expect_err("scalar array items should fail");
        assert!(matches!(
            err,
            PayloadError::InvalidShape { ref path, .. } if path == "options[0]"
        ));
    }

    #[test]
    fn blank_id_reads_as_absent() {
        let map = AttributeMap::new().with("id", "  ").with("name", "x");
        assert!(map.id_value().is_none());

        let map = AttributeMap::new().with("id", 4);
        assert_eq!(map.id_value(), Some(&Value::Int(4)));
    }
}
