use crate::value::Value;
use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

///
/// RecordId
///
/// Persistence id assigned by the gateway (or chosen by the client before
/// the first save). Always positive.
///

#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, From, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(transparent)]
pub struct RecordId(u64);

impl RecordId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Read an id from an attribute or payload value.
    ///
    /// Accepts positive integers and their decimal text form.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(n) => u64::try_from(*n).ok().filter(|n| *n > 0).map(Self),
            Value::Text(s) => s.trim().parse::<u64>().ok().filter(|n| *n > 0).map(Self),
            _ => None,
        }
    }
}

impl From<RecordId> for Value {
    fn from(id: RecordId) -> Self {
        // ids beyond i64::MAX never come out of a gateway
        Self::Int(i64::try_from(id.0).unwrap_or(i64::MAX))
    }
}

///
/// RecordHandle
///
/// In-memory identity of one record. Two payload items refer to the same
/// record exactly when their handles are equal.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct RecordHandle(Ulid);

impl RecordHandle {
    #[must_use]
    pub fn generate() -> Self {
        Self(Ulid::new())
    }
}
