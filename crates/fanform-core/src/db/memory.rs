use crate::{
    db::{Filter, Gateway, Row},
    error::{ErrorClass, ErrorOrigin, InternalError},
    model::EntityModel,
    record::{Record, RecordId},
    value::coerce,
};
use std::collections::{BTreeMap, BTreeSet};

///
/// Table
///

#[derive(Clone, Debug, Default)]
struct Table {
    rows: BTreeMap<RecordId, Row>,
    last_id: u64,
}

impl Table {
    fn next_id(&mut self) -> RecordId {
        self.last_id += 1;
        RecordId::new(self.last_id)
    }
}

///
/// MemoryStore
///
/// In-memory gateway. Tables are keyed by entity name and ids increase
/// monotonically per table. `begin` pushes a snapshot that `rollback`
/// restores, so units of work may nest.
///

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    tables: BTreeMap<&'static str, Table>,
    snapshots: Vec<BTreeMap<&'static str, Table>>,
    frozen: BTreeSet<&'static str>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows stored for an entity.
    #[must_use]
    pub fn count(&self, model: &EntityModel) -> usize {
        self.tables
            .get(model.entity_name)
            .map_or(0, |table| table.rows.len())
    }

    /// Make every write to one entity fail with a conflict.
    pub fn freeze(&mut self, model: &'static EntityModel) {
        self.frozen.insert(model.entity_name);
    }

    pub fn thaw(&mut self, model: &'static EntityModel) {
        self.frozen.remove(model.entity_name);
    }

    #[must_use]
    pub fn in_transaction(&self) -> bool {
        !self.snapshots.is_empty()
    }

    fn check_writable(&self, model: &EntityModel) -> Result<(), InternalError> {
        if self.frozen.contains(model.entity_name) {
            return Err(InternalError::store_conflict(format!(
                "{} is read-only",
                model.entity_name
            )));
        }

        Ok(())
    }

    fn table_mut(&mut self, model: &'static EntityModel) -> &mut Table {
        self.tables.entry(model.entity_name).or_default()
    }

    fn materialize(
        model: &'static EntityModel,
        id: RecordId,
        row: &Row,
    ) -> Result<Record, InternalError> {
        Record::from_row(model, id, row.clone())
            .map_err(|err| InternalError::store_invariant(err.to_string()))
    }

    // Filter values are coerced into the stored shape so `"5"` finds `5`.
    fn normalize(model: &EntityModel, filter: &Filter) -> Result<Filter, InternalError> {
        filter
            .terms()
            .iter()
            .map(|(name, value)| {
                let field = model.field(name).ok_or_else(|| {
                    InternalError::new(
                        ErrorClass::Unsupported,
                        ErrorOrigin::Store,
                        format!("unknown filter attribute '{name}' for {}", model.entity_name),
                    )
                })?;
                let value = coerce(value.clone(), field.kind).map_err(|err| {
                    InternalError::new(ErrorClass::Unsupported, ErrorOrigin::Store, err.to_string())
                })?;

                Ok((name.clone(), value))
            })
            .collect()
    }
}

impl Gateway for MemoryStore {
    fn find_by_id(
        &self,
        model: &'static EntityModel,
        id: RecordId,
    ) -> Result<Option<Record>, InternalError> {
        self.tables
            .get(model.entity_name)
            .and_then(|table| table.rows.get(&id))
            .map(|row| Self::materialize(model, id, row))
            .transpose()
    }

    fn find_all_by(
        &self,
        model: &'static EntityModel,
        filter: &Filter,
    ) -> Result<Vec<Record>, InternalError> {
        let filter = Self::normalize(model, filter)?;
        let Some(table) = self.tables.get(model.entity_name) else {
            return Ok(Vec::new());
        };

        table
            .rows
            .iter()
            .filter(|(id, row)| filter.matches(**id, row))
            .map(|(id, row)| Self::materialize(model, *id, row))
            .collect()
    }

    fn create(&mut self, model: &'static EntityModel, row: Row) -> Result<Record, InternalError> {
        let mut record = Record::new(model);
        for (name, value) in row {
            record
                .set(&name, value)
                .map_err(|err| InternalError::store_invariant(err.to_string()))?;
        }
        self.save(&mut record)?;

        Ok(record)
    }

    fn save(&mut self, record: &mut Record) -> Result<(), InternalError> {
        let model = record.model();
        self.check_writable(model)?;

        let row = record.to_row();
        let table = self.table_mut(model);

        let id = match (record.is_persisted(), record.id()) {
            (true, Some(id)) => {
                let slot = table
                    .rows
                    .get_mut(&id)
                    .ok_or_else(|| InternalError::store_not_found(model.entity_name, id))?;
                *slot = row;
                id
            }
            (true, None) => {
                return Err(InternalError::store_invariant(format!(
                    "persisted {} without an id",
                    model.entity_name
                )));
            }
            (false, Some(id)) => {
                if table.rows.contains_key(&id) {
                    return Err(InternalError::store_conflict(format!(
                        "{} {id} already exists",
                        model.entity_name
                    )));
                }
                table.last_id = table.last_id.max(id.get());
                table.rows.insert(id, row);
                id
            }
            (false, None) => {
                let id = table.next_id();
                table.rows.insert(id, row);
                id
            }
        };

        record.mark_persisted(id);

        Ok(())
    }

    fn delete(
        &mut self,
        model: &'static EntityModel,
        id: RecordId,
    ) -> Result<bool, InternalError> {
        self.check_writable(model)?;

        Ok(self
            .tables
            .get_mut(model.entity_name)
            .and_then(|table| table.rows.remove(&id))
            .is_some())
    }

    fn begin(&mut self) -> Result<(), InternalError> {
        self.snapshots.push(self.tables.clone());

        Ok(())
    }

    fn commit(&mut self) -> Result<(), InternalError> {
        self.snapshots
            .pop()
            .map(|_| ())
            .ok_or_else(|| InternalError::store_invariant("commit without begin"))
    }

    fn rollback(&mut self) -> Result<(), InternalError> {
        let snapshot = self
            .snapshots
            .pop()
            .ok_or_else(|| InternalError::store_invariant("rollback without begin"))?;
        self.tables = snapshot;

        Ok(())
    }
}
