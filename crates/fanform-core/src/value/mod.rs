mod coerce;


use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// re-exports
pub use coerce::{CoerceError, coerce};

///
/// CONSTANTS
///

/// Text forms that read as `true` for checkbox and acceptance semantics.
const TRUTHY_TEXT: [&str; 6] = ["1", "true", "t", "yes", "y", "on"];

///
/// Value
///
/// Scalar attribute value carried by records and payloads.
///
/// Null        → the attribute is unset (never written, or explicitly cleared).
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl Value {
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Null, or text that is empty after trimming.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Checkbox coercion: booleans pass through, non-zero integers and a
    /// small set of affirmative strings read as `true`, everything else `false`.
    #[must_use]
    pub fn to_bool(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Int(n) => *n != 0,
            Self::Text(s) => {
                let s = s.trim();
                TRUTHY_TEXT.iter().any(|t| s.eq_ignore_ascii_case(t))
            }
            Self::Null | Self::Timestamp(_) => false,
        }
    }

    /// Render as display text; Null renders empty.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::Null => String::new(),
            other => other.to_string(),
        }
    }

    /// Convert one JSON scalar at the payload boundary.
    ///
    /// Returns `None` for arrays and objects; those are nested payloads,
    /// not values.
    #[must_use]
    pub fn from_json(json: &serde_json::Value) -> Option<Self> {
        match json {
            serde_json::Value::Null => Some(Self::Null),
            serde_json::Value::Bool(b) => Some(Self::Bool(*b)),
            serde_json::Value::Number(n) => Some(
                n.as_i64()
                    .map_or_else(|| Self::Text(n.to_string()), Self::Int),
            ),
            serde_json::Value::String(s) => Some(Self::Text(s.clone())),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => None,
        }
    }

    /// Convert back into JSON for external surfaces.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Int(n) => serde_json::Value::from(*n),
            Self::Text(s) => serde_json::Value::String(s.clone()),
            Self::Timestamp(ts) => serde_json::Value::String(ts.to_rfc3339()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
            Self::Timestamp(ts) => write!(f, "{}", ts.to_rfc3339()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(ts: DateTime<Utc>) -> Self {
        Self::Timestamp(ts)
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Self::Null, Into::into)
    }
}
