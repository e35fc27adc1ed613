use crate::{model::FieldKind, value::Value};
use chrono::{DateTime, Utc};
use thiserror::Error as ThisError;

///
/// CoerceError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("cannot coerce {actual} into {expected}")]
pub struct CoerceError {
    pub expected: &'static str,
    pub actual: String,
}

impl CoerceError {
    fn new(expected: &'static str, actual: &Value) -> Self {
        Self {
            expected,
            actual: format!("{actual:?}"),
        }
    }
}

/// Coerce an incoming value into the storage shape of a field kind.
///
/// Null always passes through. Text inputs are parsed for numeric, boolean
/// and timestamp kinds; blank text clears non-text kinds.
pub fn coerce(value: Value, kind: FieldKind) -> Result<Value, CoerceError> {
    if value.is_null() {
        return Ok(Value::Null);
    }

    match kind {
        FieldKind::Id | FieldKind::Int => coerce_int(value, kind),
        FieldKind::Bool => coerce_bool(value),
        FieldKind::Text | FieldKind::LongText | FieldKind::Email => Ok(coerce_text(value)),
        FieldKind::Timestamp => coerce_timestamp(value),
    }
}

fn coerce_int(value: Value, kind: FieldKind) -> Result<Value, CoerceError> {
    let expected = if matches!(kind, FieldKind::Id) {
        "id"
    } else {
        "int"
    };

    match value {
        Value::Int(n) if matches!(kind, FieldKind::Id) && n <= 0 => {
            Err(CoerceError::new(expected, &Value::Int(n)))
        }
        Value::Int(n) => Ok(Value::Int(n)),
        Value::Text(ref s) if s.trim().is_empty() => Ok(Value::Null),
        Value::Text(ref s) => s
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|n| !matches!(kind, FieldKind::Id) || *n > 0)
            .map(Value::Int)
            .ok_or_else(|| CoerceError::new(expected, &value)),
        other => Err(CoerceError::new(expected, &other)),
    }
}

fn coerce_bool(value: Value) -> Result<Value, CoerceError> {
    match value {
        Value::Bool(b) => Ok(Value::Bool(b)),
        Value::Int(n) => Ok(Value::Bool(n != 0)),
        Value::Text(ref s) if s.trim().is_empty() => Ok(Value::Null),
        Value::Text(_) => Ok(Value::Bool(value.to_bool())),
        other @ Value::Timestamp(_) => Err(CoerceError::new("bool", &other)),
        Value::Null => Ok(Value::Null),
    }
}

fn coerce_text(value: Value) -> Value {
    match value {
        Value::Text(s) => Value::Text(s),
        other => Value::Text(other.to_text()),
    }
}

fn coerce_timestamp(value: Value) -> Result<Value, CoerceError> {
    match value {
        Value::Timestamp(ts) => Ok(Value::Timestamp(ts)),
        Value::Text(ref s) if s.trim().is_empty() => Ok(Value::Null),
        Value::Text(ref s) => DateTime::parse_from_rfc3339(s.trim())
            .map(|ts| Value::Timestamp(ts.with_timezone(&Utc)))
            .map_err(|_| CoerceError::new("timestamp", &value)),
        Value::Int(secs) => DateTime::<Utc>::from_timestamp(secs, 0)
            .map(Value::Timestamp)
            .ok_or_else(|| CoerceError::new("timestamp", &value)),
        other => Err(CoerceError::new("timestamp", &other)),
    }
}
