use super::*;
use crate::{model::catalog, record::Record};

fn question(name: &str) -> Record {
    let mut record = Record::new(&catalog::QUESTION);
    record.set("name", name).expect("set should succeed");
    record
}

fn campaign(name: &str) -> Record {
    let mut record = Record::new(&catalog::CAMPAIGN);
    record.set("name", name).expect("set should succeed");
    record
}

#[test]
fn save_assigns_increasing_ids_and_updates_in_place() {
    let mut store = MemoryStore::new();
    let mut first = question("First");
    let mut second = question("Second");

    store.save(&mut first).expect("save should succeed");
    store.save(&mut second).expect("save should succeed");
    assert_eq!(first.id(), Some(RecordId::new(1)));
    assert_eq!(second.id(), Some(RecordId::new(2)));

    first.set("name", "Renamed").expect("set should succeed");
    store.save(&mut first).expect("update should succeed");

    let found = store
        .find_by_id(&catalog::QUESTION, RecordId::new(1))
        .expect("find should succeed")
        .expect("row should exist");
    assert_eq!(found.name(), Some("Renamed"));
    assert!(found.is_persisted());
    assert_eq!(store.count(&catalog::QUESTION), 2);
}

#[test]
fn client_chosen_ids_are_kept_and_conflicts_rejected() {
    let mut store = MemoryStore::new();
    let mut chosen = question("Chosen");
    chosen.set("id", 40).expect("set should succeed");
    store.save(&mut chosen).expect("save should succeed");
    assert_eq!(chosen.id(), Some(RecordId::new(40)));

    let mut next = question("Next");
    store.save(&mut next).expect("save should succeed");
    assert_eq!(next.id(), Some(RecordId::new(41)));

    let mut clash = question("Clash");
    clash.set("id", 40).expect("set should succeed");
    let err = store.save(&mut clash).expect_err("duplicate id should fail");
    assert_eq!(err.class, crate::error::ErrorClass::Conflict);
}

#[test]
fn filters_coerce_text_into_stored_kinds() {
    let mut store = MemoryStore::new();
    let mut record = question("Colour");
    record.set("campaign_id", 7).expect("set should succeed");
    store.save(&mut record).expect("save should succeed");

    let found = store
        .find_all_by(&catalog::QUESTION, &Filter::new().eq("campaign_id", "7"))
        .expect("find should succeed");
    assert_eq!(found.len(), 1);

    let none = store
        .find_first_by(&catalog::QUESTION, &Filter::new().eq("name", "Size"))
        .expect("find should succeed");
    assert!(none.is_none());

    store
        .find_all_by(&catalog::QUESTION, &Filter::new().eq("colour", "x"))
        .expect_err("unknown attribute should fail");
}

#[test]
fn rollback_restores_the_snapshot() {
    let mut store = MemoryStore::new();

    let result: Result<(), InternalError> = unit_of_work(&mut store, |store| {
        store.save(&mut question("Kept?"))?;
        Err(InternalError::store_internal("boom"))
    });
    result.expect_err("closure error should surface");

    assert_eq!(store.count(&catalog::QUESTION), 0);
    assert!(!store.in_transaction());

    unit_of_work(&mut store, |store| store.save(&mut question("Kept")))
        .expect("unit of work should commit");
    assert_eq!(store.count(&catalog::QUESTION), 1);
}

#[test]
fn save_graph_writes_children_with_foreign_keys() {
    let mut store = MemoryStore::new();
    let mut root = campaign("Biggest Fan");

    let mut colour = question("Colour");
    let mut option = Record::new(&catalog::OPTION);
    option.set("name", "Red").expect("set should succeed");
    colour
        .association_mut("options")
        .expect("options should exist")
        .attach(option);
    root.association_mut("questions")
        .expect("questions should exist")
        .attach(colour);

    save_graph(&mut store, &mut root).expect("graph save should succeed");

    let campaign_id = root.id().expect("campaign should have an id");
    let questions = store
        .find_all_by(&catalog::QUESTION, &Filter::new().eq("campaign_id", campaign_id))
        .expect("find should succeed");
    assert_eq!(questions.len(), 1);

    let question_id = questions[0].id().expect("question should have an id");
    let options = store
        .find_all_by(&catalog::OPTION, &Filter::new().eq("question_id", question_id))
        .expect("find should succeed");
    assert_eq!(options.len(), 1);

    assert!(matches!(root.get("created_at"), crate::value::Value::Timestamp(_)));
}

#[test]
fn nested_children_inherit_ancestor_keys() {
    let mut store = MemoryStore::new();
    let mut root = campaign("Colours");
    root.set("id", 7).expect("set should succeed");

    let mut colour = question("Colour");
    let mut option = Record::new(&catalog::OPTION);
    option.set("name", "Red").expect("set should succeed");
    colour
        .association_mut("options")
        .expect("options should exist")
        .attach(option);
    root.association_mut("questions")
        .expect("questions should exist")
        .attach(colour);

    save_record(&mut store, &mut root).expect("save should succeed");
    save_association(&mut store, &mut root, "questions").expect("save should succeed");

    let options = store
        .find_all_by(&catalog::OPTION, &Filter::new().eq("campaign_id", 7))
        .expect("find should succeed");
    assert_eq!(options.len(), 1);
    assert_eq!(options[0].name(), Some("Red"));
    assert!(!options[0].get("question_id").is_null());
}

#[test]
fn belongs_to_targets_are_saved_first() {
    let mut store = MemoryStore::new();
    let mut root = campaign("Owned");
    let mut client = Record::new(&catalog::CLIENT);
    client.set("name", "Acme").expect("set should succeed");
    root.association_mut("client")
        .expect("client should exist")
        .attach(client);

    save_record(&mut store, &mut root).expect("save should succeed");

    let client_id = root.records("client")[0].id();
    assert!(client_id.is_some());
    assert_eq!(RecordId::from_value(root.get("client_id")), client_id);
}

#[test]
fn failures_aggregate_across_branches() {
    let mut store = MemoryStore::new();
    store.freeze(&catalog::TAG);

    let mut root = campaign("Partial");
    for name in ["a", "b"] {
        let mut tag = Record::new(&catalog::TAG);
        tag.set("name", name).expect("set should succeed");
        root.association_mut("tags")
            .expect("tags should exist")
            .attach(tag);
    }
    root.association_mut("questions")
        .expect("questions should exist")
        .attach(question("Still saved"));

    let err = save_graph(&mut store, &mut root).expect_err("frozen tags should fail");

    let paths: Vec<_> = err.failures.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, ["tags[0]", "tags[1]"]);
    assert_eq!(store.count(&catalog::QUESTION), 1);
}

#[test]
fn ensure_loaded_fetches_stored_children_once() {
    let mut store = MemoryStore::new();
    let mut root = campaign("Loaded");
    root.association_mut("fields")
        .expect("fields should exist")
        .attach({
            let mut field = Record::new(&catalog::FIELD);
            field.set("name", "Email").expect("set should succeed");
            field
        });
    save_graph(&mut store, &mut root).expect("save should succeed");

    let id = root.id().expect("campaign should have an id");
    let mut reloaded = store
        .find_by_id(&catalog::CAMPAIGN, id)
        .expect("find should succeed")
        .expect("campaign should exist");
    assert!(!reloaded.association("fields").expect("fields").is_loaded());

    ensure_loaded(&store, &mut reloaded, "fields").expect("load should succeed");
    assert_eq!(reloaded.records("fields").len(), 1);

    ensure_loaded(&store, &mut reloaded, "fields").expect("second load should be a no-op");
    assert_eq!(reloaded.records("fields").len(), 1);
}
