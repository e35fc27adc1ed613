//! Association reconciliation.
//!
//! Merges a partially specified nested payload into a record graph:
//! items carrying a known `id` update the matching record in place, items
//! without one (or with an unknown one) become new records, ready-built
//! records are attached as-is. Nothing is ever removed.

mod error;

#[cfg(test)]
mod tests;

use crate::{
    ID_FIELD,
    db::{Gateway, ensure_loaded},
    model::EntityModel,
    obs::sink::{self, MetricsEvent},
    payload::{AttributeMap, Payload, PayloadValue},
    record::{Record, RecordError, RecordHandle, RecordId, require_association},
    value::Value,
};
use tracing::debug;

// re-exports
pub use error::ReconcileError;

///
/// Tally
///

#[derive(Default)]
struct Tally {
    created: u64,
    updated: u64,
    attached: u64,
}

/// Nested payloads keyed by their declared association name.
type NestedItems = Vec<(&'static str, Vec<Payload>)>;

///
/// reconcile
///
/// Merge `incoming` into `owner`'s association and return the handles of
/// every record the items produced or touched, in item order.
///
/// The association is loaded at most once; later items see the records
/// added by earlier ones.
///

pub fn reconcile<G: Gateway + ?Sized>(
    gateway: &G,
    owner: &mut Record,
    association: &str,
    incoming: Vec<Payload>,
) -> Result<Vec<RecordHandle>, ReconcileError> {
    let model = owner.model();
    let assoc_model = model.association(association).ok_or_else(|| {
        ReconcileError::UnknownAssociation {
            entity: model.entity_name,
            association: association.to_string(),
        }
    })?;

    ensure_loaded(gateway, owner, association)
        .map_err(|err| ReconcileError::from(err).with_field(association))?;

    let mut tally = Tally::default();
    let mut outgoing = Vec::with_capacity(incoming.len());

    for (index, item) in incoming.into_iter().enumerate() {
        let handle = reconcile_item(
            gateway,
            owner,
            assoc_model.name,
            assoc_model.target,
            item,
            &mut tally,
        )
        .map_err(|err| err.with_index(index).with_field(association))?;
        outgoing.push(handle);
    }

    debug!(
        entity = model.entity_name,
        association,
        created = tally.created,
        updated = tally.updated,
        attached = tally.attached,
        "association reconciled"
    );
    sink::record(MetricsEvent::Reconciled {
        entity: assoc_model.target.entity_name,
        created: tally.created,
        updated: tally.updated,
        attached: tally.attached,
    });

    Ok(outgoing)
}

fn reconcile_item<G: Gateway + ?Sized>(
    gateway: &G,
    owner: &mut Record,
    association: &'static str,
    target: &'static EntityModel,
    item: Payload,
    tally: &mut Tally,
) -> Result<RecordHandle, ReconcileError> {
    let map = match item {
        Payload::Record(record) => {
            if record.model() != target {
                return Err(ReconcileError::InvalidShape {
                    expected: target.entity_name,
                    actual: record.entity_name(),
                });
            }

            let handle = record.handle();
            let assoc = require_association(owner, association)?;
            if !assoc.contains(handle) {
                assoc.attach(record);
                tally.attached += 1;
            }

            return Ok(handle);
        }
        Payload::Attributes(map) => map,
    };

    // fresh lookup per item: a miss never inherits an earlier match
    let matched_id = map.id_value().and_then(RecordId::from_value);
    let (plain, nested) = split(target, map)?;

    let assoc = require_association(owner, association)?;
    if let Some(position) = matched_id.and_then(|id| assoc.position_by_id(id)) {
        let record = &mut assoc.records_mut()[position];
        record.assign(
            plain
                .iter()
                .filter(|(name, _)| name != ID_FIELD)
                .map(|(name, value)| (name.as_str(), value.clone())),
        )?;
        for (name, items) in nested {
            reconcile(gateway, record, name, items)?;
        }

        tally.updated += 1;
        return Ok(record.handle());
    }

    let mut record = Record::new(target);
    record.assign(plain.iter().map(|(name, value)| (name.as_str(), value.clone())))?;
    for (name, items) in nested {
        reconcile(gateway, &mut record, name, items)?;
    }

    let handle = record.handle();
    require_association(owner, association)?.attach(record);
    tally.created += 1;

    Ok(handle)
}

// Declared association names are the only source for nested keys.
fn split(
    model: &'static EntityModel,
    map: AttributeMap,
) -> Result<(Vec<(String, Value)>, NestedItems), ReconcileError> {
    let mut plain = Vec::new();
    let mut nested = Vec::new();

    for (key, value) in map {
        match (model.association(&key), value) {
            (Some(assoc), PayloadValue::Nested(items)) => nested.push((assoc.name, items)),
            (Some(_), PayloadValue::Scalar(Value::Null)) => {}
            (Some(_), PayloadValue::Scalar(_)) => {
                return Err(ReconcileError::InvalidShape {
                    expected: "nested records",
                    actual: "scalar",
                }
                .with_field(key));
            }
            (None, PayloadValue::Scalar(value)) => plain.push((key, value)),
            (None, PayloadValue::Nested(_)) => {
                return Err(RecordError::UnknownAttribute {
                    entity: model.entity_name,
                    attribute: key,
                }
                .into());
            }
        }
    }

    Ok((plain, nested))
}
