use crate::{
    db::{Filter, Gateway},
    error::InternalError,
    model::AssociationKind,
    obs::sink::{self, MetricsEvent},
    record::{Record, RecordId, require_association},
};
use tracing::debug;

/// Fetch an association's stored rows once, if it is not loaded yet.
///
/// New owners have nothing stored; their associations are simply marked
/// loaded. Records already attached in memory survive the load.
pub fn ensure_loaded<G: Gateway + ?Sized>(
    gateway: &G,
    owner: &mut Record,
    association: &str,
) -> Result<(), InternalError> {
    let owner_id = owner.id().filter(|_| owner.is_persisted());
    let assoc = require_association(owner, association)?;
    if assoc.is_loaded() {
        return Ok(());
    }

    let model = assoc.model();
    let fetched = match (model.kind, owner_id) {
        (_, None) => Vec::new(),
        (AssociationKind::HasMany, Some(id)) => {
            let filter = Filter::new().eq(model.foreign_key, id);
            gateway.find_all_by(model.target, &filter)?
        }
        (AssociationKind::BelongsTo, Some(_)) => {
            match RecordId::from_value(owner.get(model.foreign_key)) {
                Some(target_id) => gateway
                    .find_by_id(model.target, target_id)?
                    .into_iter()
                    .collect(),
                None => Vec::new(),
            }
        }
    };

    let rows = fetched.len() as u64;
    debug!(
        entity = model.target.entity_name,
        association = model.name,
        rows,
        "association loaded"
    );
    sink::record(MetricsEvent::Loaded {
        entity: model.target.entity_name,
        rows,
    });

    require_association(owner, association)?.load(fetched);

    Ok(())
}
