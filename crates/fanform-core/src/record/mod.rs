mod association;
mod id;

#[cfg(test)]
mod tests;

use crate::{
    ID_FIELD, NAME_FIELD,
    model::{EntityModel, FieldKind},
    value::{Value, coerce},
};
use std::collections::BTreeMap;
use thiserror::Error as ThisError;

// re-exports
pub use association::Association;
pub use id::{RecordHandle, RecordId};

static NULL: Value = Value::Null;

///
/// RecordError
///
/// Attribute-level assignment failures.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum RecordError {
    #[error("unknown attribute '{attribute}' for {entity}")]
    UnknownAttribute {
        entity: &'static str,
        attribute: String,
    },

    #[error("invalid value for {entity}.{attribute}: {message}")]
    InvalidValue {
        entity: &'static str,
        attribute: String,
        message: String,
    },
}

///
/// Record
///
/// One in-memory row of an entity plus its association collections.
///
/// Identity is the `handle`; the persistence `id` may be client-chosen
/// before the record is stored, so `persisted` is tracked separately.
///

#[derive(Clone, Debug)]
pub struct Record {
    model: &'static EntityModel,
    handle: RecordHandle,
    persisted: bool,
    attributes: BTreeMap<&'static str, Value>,
    associations: BTreeMap<&'static str, Association>,
}

impl Record {
    /// Build a new, unsaved record. All associations start loaded and empty.
    #[must_use]
    pub fn new(model: &'static EntityModel) -> Self {
        Self::with_state(model, false, true)
    }

    /// Materialize a stored row. Associations load lazily on first use.
    pub fn from_row(
        model: &'static EntityModel,
        id: RecordId,
        row: BTreeMap<String, Value>,
    ) -> Result<Self, RecordError> {
        let mut record = Self::with_state(model, true, false);
        for (name, value) in row {
            record.set(&name, value)?;
        }
        record.attributes.insert(ID_FIELD, id.into());

        Ok(record)
    }

    fn with_state(model: &'static EntityModel, persisted: bool, loaded: bool) -> Self {
        let associations = model
            .associations
            .iter()
            .map(|assoc| (assoc.name, Association::new(assoc, loaded)))
            .collect();

        Self {
            model,
            handle: RecordHandle::generate(),
            persisted,
            attributes: BTreeMap::new(),
            associations,
        }
    }

    #[must_use]
    pub const fn model(&self) -> &'static EntityModel {
        self.model
    }

    #[must_use]
    pub const fn entity_name(&self) -> &'static str {
        self.model.entity_name
    }

    #[must_use]
    pub const fn handle(&self) -> RecordHandle {
        self.handle
    }

    #[must_use]
    pub fn id(&self) -> Option<RecordId> {
        self.attributes.get(ID_FIELD).and_then(RecordId::from_value)
    }

    #[must_use]
    pub const fn is_persisted(&self) -> bool {
        self.persisted
    }

    /// Record the outcome of a successful store write.
    pub fn mark_persisted(&mut self, id: RecordId) {
        self.attributes.insert(ID_FIELD, id.into());
        self.persisted = true;
    }

    /// Read an attribute; unset and undeclared names read as Null.
    #[must_use]
    pub fn get(&self, name: &str) -> &Value {
        self.attributes.get(name).unwrap_or(&NULL)
    }

    /// Name attribute as text, if set.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.get(NAME_FIELD).as_text()
    }

    /// Write one declared attribute, coercing into the field's kind.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), RecordError> {
        let field = self
            .model
            .field(name)
            .ok_or_else(|| RecordError::UnknownAttribute {
                entity: self.model.entity_name,
                attribute: name.to_string(),
            })?;

        let value = coerce(value.into(), field.kind).map_err(|err| RecordError::InvalidValue {
            entity: self.model.entity_name,
            attribute: name.to_string(),
            message: err.to_string(),
        })?;

        if value.is_null() {
            self.attributes.remove(field.name);
        } else {
            self.attributes.insert(field.name, value);
        }

        Ok(())
    }

    /// Field-by-field overwrite; attributes not mentioned are kept.
    pub fn assign<'a>(
        &mut self,
        attributes: impl IntoIterator<Item = (&'a str, Value)>,
    ) -> Result<(), RecordError> {
        for (name, value) in attributes {
            self.set(name, value)?;
        }

        Ok(())
    }

    /// Iterate set attributes in name order.
    pub fn attributes(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        self.attributes.iter().map(|(k, v)| (*k, v))
    }

    /// Attribute snapshot in row form (without the id).
    #[must_use]
    pub fn to_row(&self) -> BTreeMap<String, Value> {
        self.attributes
            .iter()
            .filter(|(name, _)| **name != ID_FIELD)
            .map(|(name, value)| ((*name).to_string(), value.clone()))
            .collect()
    }

    /// Native, non-key attribute declared on this record's model.
    #[must_use]
    pub fn is_native_attribute(&self, name: &str) -> bool {
        self.model
            .field(name)
            .is_some_and(|field| !matches!(field.kind, FieldKind::Id))
    }

    // ------------------------------------------------------------------
    // Associations
    // ------------------------------------------------------------------

    #[must_use]
    pub fn association(&self, name: &str) -> Option<&Association> {
        self.associations.get(name)
    }

    pub fn association_mut(&mut self, name: &str) -> Option<&mut Association> {
        self.associations.get_mut(name)
    }

    /// Records currently held by an association; empty when undeclared.
    #[must_use]
    pub fn records(&self, name: &str) -> &[Record] {
        match self.associations.get(name) {
            Some(assoc) => assoc.records(),
            None => &[],
        }
    }

    pub fn associations(&self) -> impl Iterator<Item = &Association> {
        self.associations.values()
    }

    pub fn associations_mut(&mut self) -> impl Iterator<Item = &mut Association> {
        self.associations.values_mut()
    }

    /// Depth-first search for a record by handle, including `self`.
    #[must_use]
    pub fn find_handle(&self, handle: RecordHandle) -> Option<&Self> {
        if self.handle == handle {
            return Some(self);
        }

        self.associations
            .values()
            .flat_map(Association::records)
            .find_map(|child| child.find_handle(handle))
    }
}

/// Record identity is the in-memory handle.
impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle
    }
}

impl Eq for Record {}

/// First record whose `name` equals the given value.
#[must_use]
pub fn by_name<'a>(records: &'a [Record], name: &str) -> Option<&'a Record> {
    records.iter().find(|record| record.name() == Some(name))
}

/// Mutable counterpart of [`by_name`].
pub fn by_name_mut<'a>(records: &'a mut [Record], name: &str) -> Option<&'a mut Record> {
    records.iter_mut().find(|record| record.name() == Some(name))
}

/// Crate-internal guard for association bookkeeping.
pub(crate) fn require_association<'a>(
    record: &'a mut Record,
    name: &str,
) -> Result<&'a mut Association, crate::error::InternalError> {
    let entity = record.entity_name();
    record.association_mut(name).ok_or_else(|| {
        crate::error::InternalError::record_invariant(format!(
            "association '{name}' missing on {entity}"
        ))
    })
}
