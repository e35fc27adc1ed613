//! Graph save.
//!
//! Every branch is attempted; failures are collected with the path of
//! the record that failed and reported together at the end.

use crate::{
    db::Gateway,
    error::InternalError,
    model::AssociationKind,
    obs::sink::{self, MetricsEvent},
    record::{Record, RecordId},
    value::Value,
};
use chrono::Utc;
use std::fmt;
use thiserror::Error as ThisError;
use tracing::warn;

///
/// SaveFailure
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SaveFailure {
    pub path: String,
    pub error: InternalError,
}

impl fmt::Display for SaveFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.error)
        } else {
            write!(f, "{}: {}", self.path, self.error)
        }
    }
}

///
/// SaveError
/// Every record that could not be written during one save call.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("save failed for {} record(s): {}", .failures.len(), render(.failures))]
pub struct SaveError {
    pub failures: Vec<SaveFailure>,
}

impl SaveError {
    /// First underlying store error, for callers that need one cause.
    #[must_use]
    pub fn first(&self) -> Option<&InternalError> {
        self.failures.first().map(|failure| &failure.error)
    }
}

impl From<InternalError> for SaveError {
    fn from(error: InternalError) -> Self {
        Self {
            failures: vec![SaveFailure {
                path: String::new(),
                error,
            }],
        }
    }
}

fn render(failures: &[SaveFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

///
/// SaveRun
/// Accumulator threaded through one save call.
///

#[derive(Default)]
struct SaveRun {
    saved: u64,
    failures: Vec<SaveFailure>,
}

impl SaveRun {
    fn fail(&mut self, path: &str, error: InternalError) {
        warn!(path, error = %error, "record save failed");
        self.failures.push(SaveFailure {
            path: path.to_string(),
            error,
        });
    }

    fn finish(self, entity: &'static str) -> Result<(), SaveError> {
        sink::record(MetricsEvent::Saved {
            entity,
            records: self.saved,
            failures: self.failures.len() as u64,
        });

        if self.failures.is_empty() {
            Ok(())
        } else {
            Err(SaveError {
                failures: self.failures,
            })
        }
    }
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

///
/// save_record
///
/// Persist one record after its `BelongsTo` targets; the targets' ids are
/// copied into the record's foreign keys. `HasMany` collections are left
/// alone (see [`save_graph`]).
///

pub fn save_record<G: Gateway + ?Sized>(gateway: &mut G, record: &mut Record) -> Result<(), SaveError> {
    let entity = record.entity_name();
    let mut run = SaveRun::default();
    save_shallow(gateway, record, "", &mut run);

    run.finish(entity)
}

/// Persist a record and every loaded association beneath it.
pub fn save_graph<G: Gateway + ?Sized>(gateway: &mut G, record: &mut Record) -> Result<(), SaveError> {
    let entity = record.entity_name();
    let mut run = SaveRun::default();
    save_deep(gateway, record, "", &[], &mut run);

    run.finish(entity)
}

///
/// save_association
///
/// Persist every record in one `HasMany` association of a saved owner,
/// copying the owner's id into each child's foreign key and recursing into
/// the child's own loaded associations.
///
/// Foreign keys are inherited down the graph: an option nested under a
/// question also receives the campaign id when its own `campaign_id` is
/// unset.
///

pub fn save_association<G: Gateway + ?Sized>(
    gateway: &mut G,
    owner: &mut Record,
    association: &str,
) -> Result<(), SaveError> {
    let entity = owner
        .association(association)
        .map_or(owner.entity_name(), |assoc| {
            assoc.model().target.entity_name
        });
    let mut run = SaveRun::default();
    save_children(gateway, owner, association, "", &[], &mut run);

    run.finish(entity)
}

fn save_shallow<G: Gateway + ?Sized>(
    gateway: &mut G,
    record: &mut Record,
    path: &str,
    run: &mut SaveRun,
) {
    // parents first, so their ids can be copied into our foreign keys
    let mut keys = Vec::new();
    for assoc in record.associations_mut() {
        if assoc.kind() != AssociationKind::BelongsTo || !assoc.is_loaded() {
            continue;
        }
        let name = assoc.name();
        let foreign_key = assoc.model().foreign_key;
        let Some(target) = assoc.target_mut() else {
            continue;
        };

        let target_path = join(path, name);
        save_shallow(gateway, target, &target_path, run);
        keys.push((foreign_key, target.id()));
    }

    for (foreign_key, id) in keys {
        if let Some(id) = id
            && let Err(err) = record.set(foreign_key, id)
        {
            run.fail(path, InternalError::record_invariant(err.to_string()));
        }
    }

    stamp_timestamps(record);

    match gateway.save(record) {
        Ok(()) => run.saved += 1,
        Err(err) => run.fail(path, err),
    }
}

/// Ancestor foreign keys and ids handed down to nested children.
type Inherited = Vec<(&'static str, RecordId)>;

fn save_deep<G: Gateway + ?Sized>(
    gateway: &mut G,
    record: &mut Record,
    path: &str,
    inherited: &[(&'static str, RecordId)],
    run: &mut SaveRun,
) {
    save_shallow(gateway, record, path, run);

    let names: Vec<&'static str> = record
        .associations()
        .filter(|assoc| assoc.kind() == AssociationKind::HasMany && assoc.is_loaded())
        .map(|assoc| assoc.name())
        .collect();

    for name in names {
        save_children(gateway, record, name, path, inherited, run);
    }
}

fn save_children<G: Gateway + ?Sized>(
    gateway: &mut G,
    owner: &mut Record,
    association: &str,
    path: &str,
    inherited: &[(&'static str, RecordId)],
    run: &mut SaveRun,
) {
    let assoc_path = join(path, association);
    let owner_id = owner.id().filter(|_| owner.is_persisted());

    let Some(assoc) = owner.association_mut(association) else {
        run.fail(
            &assoc_path,
            InternalError::record_invariant(format!("unknown association '{association}'")),
        );
        return;
    };
    if assoc.kind() != AssociationKind::HasMany {
        return;
    }

    let foreign_key = assoc.model().foreign_key;
    for (index, child) in assoc.records_mut().iter_mut().enumerate() {
        let child_path = format!("{assoc_path}[{index}]");

        let Some(owner_id) = owner_id else {
            run.fail(
                &child_path,
                InternalError::store_invariant("owner was not persisted"),
            );
            continue;
        };
        if let Err(err) = child.set(foreign_key, owner_id) {
            run.fail(&child_path, InternalError::record_invariant(err.to_string()));
            continue;
        }
        inherit_keys(child, inherited);

        let mut nested: Inherited = inherited.to_vec();
        nested.retain(|(key, _)| *key != foreign_key);
        nested.push((foreign_key, owner_id));

        save_deep(gateway, child, &child_path, &nested, run);
    }
}

// Fill unset ancestor keys the child's model declares.
fn inherit_keys(child: &mut Record, inherited: &[(&'static str, RecordId)]) {
    for (key, id) in inherited {
        if child.model().field(key).is_some() && child.get(key).is_null() {
            // declared and key-typed, so the write cannot fail
            let _ = child.set(key, *id);
        }
    }
}

fn stamp_timestamps(record: &mut Record) {
    if !record.model().has_timestamps() {
        return;
    }

    let now = Value::from(Utc::now());
    if record.get("created_at").is_null() {
        // declared on every model that has_timestamps()
        let _ = record.set("created_at", now.clone());
    }
    let _ = record.set("updated_at", now);
}
