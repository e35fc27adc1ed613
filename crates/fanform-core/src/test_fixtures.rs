use crate::{
    db::{MemoryStore, save_graph},
    model::{EntityModel, catalog},
    payload::AttributeMap,
    record::{Record, RecordId},
};

/// Unsaved record with only its `name` set.
pub(crate) fn named(model: &'static EntityModel, name: &str) -> Record {
    let mut record = Record::new(model);
    record.set("name", name).expect("set should succeed");
    record
}

/// Attribute payload carrying just a name.
pub(crate) fn name_attrs(name: &str) -> AttributeMap {
    AttributeMap::new().with("name", name)
}

/// Store a campaign with one question (two options) and one field.
/// Returns the campaign id.
pub(crate) fn stored_campaign(store: &mut MemoryStore) -> RecordId {
    let mut campaign = named(&catalog::CAMPAIGN, "Biggest Fan");

    let mut colour = named(&catalog::QUESTION, "Colour");
    for option in ["Red", "Blue"] {
        colour
            .association_mut("options")
            .expect("options should exist")
            .attach(named(&catalog::OPTION, option));
    }
    campaign
        .association_mut("questions")
        .expect("questions should exist")
        .attach(colour);
    campaign
        .association_mut("fields")
        .expect("fields should exist")
        .attach(named(&catalog::FIELD, "Email"));

    save_graph(store, &mut campaign).expect("fixture save should succeed");

    campaign.id().expect("campaign should have an id")
}

/// Reload a stored campaign with every association unloaded.
pub(crate) fn reload_campaign(store: &MemoryStore, id: RecordId) -> Record {
    use crate::db::Gateway;

    store
        .find_by_id(&catalog::CAMPAIGN, id)
        .expect("find should succeed")
        .expect("campaign should exist")
}
