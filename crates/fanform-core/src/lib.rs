//! Core runtime for fanform: scalar values, static entity models, in-memory
//! records, nested payload reconciliation, the persistence gateway, record
//! validation, and the observability sink.
//!
//! The public facades (campaign, submission, stage engine) live in the
//! `fanform` crate and are built on top of this one.

// public exports are one module level down
pub mod db;
pub mod error;
pub mod model;
pub mod name;
pub mod obs;
pub mod payload;
pub mod reconcile;
pub mod record;
pub mod validate;
pub mod validator;
pub mod value;
pub mod visitor;

// test
#[cfg(test)]
pub(crate) mod test_fixtures;

///
/// CONSTANTS
///

/// Attribute name carrying the persistence id inside payloads and rows.
pub const ID_FIELD: &str = "id";

/// Attribute name used by `by_name` lookups and schema accessors.
pub const NAME_FIELD: &str = "name";

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, stores, or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        model::{AssociationKind, AssociationModel, EntityFieldModel, EntityModel, FieldKind},
        payload::{AttributeMap, Payload, PayloadValue},
        record::{Record, RecordHandle, RecordId},
        value::Value,
    };
}
