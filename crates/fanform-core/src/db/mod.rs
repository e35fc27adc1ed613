//! Persistence boundary.
//!
//! Physical storage is pluggable through [`Gateway`]; the crate ships an
//! in-memory implementation for tests and embedders. Graph-level loading,
//! saving and transaction scoping are written against the trait only.

mod filter;
mod load;
mod memory;
mod save;

#[cfg(test)]
mod tests;

use crate::{
    error::InternalError,
    model::EntityModel,
    record::{Record, RecordId},
    value::Value,
};
use std::collections::BTreeMap;
use tracing::warn;

// re-exports
pub use filter::Filter;
pub use load::ensure_loaded;
pub use memory::MemoryStore;
pub use save::{SaveError, SaveFailure, save_association, save_graph, save_record};

/// Stored attribute row; the id is the table key and never part of the row.
pub type Row = BTreeMap<String, Value>;

///
/// Gateway
///
/// Storage contract consumed by the reconciler and the facades.
/// `begin`/`commit`/`rollback` bracket a unit of work; stores without
/// transactions may leave them as no-ops.
///

pub trait Gateway {
    fn find_by_id(
        &self,
        model: &'static EntityModel,
        id: RecordId,
    ) -> Result<Option<Record>, InternalError>;

    fn find_all_by(
        &self,
        model: &'static EntityModel,
        filter: &Filter,
    ) -> Result<Vec<Record>, InternalError>;

    fn find_first_by(
        &self,
        model: &'static EntityModel,
        filter: &Filter,
    ) -> Result<Option<Record>, InternalError> {
        Ok(self.find_all_by(model, filter)?.into_iter().next())
    }

    /// Insert a fresh row and return it as a persisted record.
    fn create(&mut self, model: &'static EntityModel, row: Row) -> Result<Record, InternalError>;

    /// Insert or update one record (without its associations).
    fn save(&mut self, record: &mut Record) -> Result<(), InternalError>;

    /// Remove one row; returns whether it existed.
    fn delete(&mut self, model: &'static EntityModel, id: RecordId)
    -> Result<bool, InternalError>;

    fn begin(&mut self) -> Result<(), InternalError> {
        Ok(())
    }

    fn commit(&mut self) -> Result<(), InternalError> {
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), InternalError> {
        Ok(())
    }
}

///
/// unit_of_work
///
/// Run `f` between `begin` and `commit`; any error rolls the store back.
///

pub fn unit_of_work<G, T, E>(gateway: &mut G, f: impl FnOnce(&mut G) -> Result<T, E>) -> Result<T, E>
where
    G: Gateway + ?Sized,
    E: From<InternalError>,
{
    gateway.begin()?;

    match f(gateway) {
        Ok(value) => {
            gateway.commit()?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = gateway.rollback() {
                warn!(error = %rollback_err, "rollback failed");
            }
            Err(err)
        }
    }
}
