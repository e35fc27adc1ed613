use crate::{ID_FIELD, db::Row, record::RecordId, value::Value};

///
/// Filter
/// Conjunction of attribute equalities. An empty filter matches every row.
///

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Filter {
    terms: Vec<(String, Value)>,
}

impl Filter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: require `name == value`.
    #[must_use]
    pub fn eq(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.terms.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn terms(&self) -> &[(String, Value)] {
        &self.terms
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Test a stored row; `id` terms compare against the row key.
    #[must_use]
    pub fn matches(&self, id: RecordId, row: &Row) -> bool {
        self.terms.iter().all(|(name, expected)| {
            if name == ID_FIELD {
                RecordId::from_value(expected) == Some(id)
            } else {
                row.get(name).unwrap_or(&Value::Null) == expected
            }
        })
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Filter {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            terms: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
