use super::*;
use crate::{
    db::{Gateway, MemoryStore, save_graph},
    model::catalog,
    obs::{MetricsEvent, MetricsSink, with_metrics_sink},
    payload::AttributeMap,
    test_fixtures::{name_attrs, named, reload_campaign, stored_campaign},
};
use proptest::prelude::*;
use std::{cell::RefCell, rc::Rc};

fn attrs(items: Vec<AttributeMap>) -> Vec<Payload> {
    items.into_iter().map(Payload::from).collect()
}

#[test]
fn empty_payload_is_a_no_op() {
    let mut store = MemoryStore::new();
    let id = stored_campaign(&mut store);
    let mut campaign = reload_campaign(&store, id);

    let out = reconcile(&store, &mut campaign, "questions", Vec::new())
        .expect("reconcile should succeed");

    assert!(out.is_empty());
    assert_eq!(campaign.records("questions").len(), 1);
}

#[test]
fn matching_id_updates_in_place() {
    let mut store = MemoryStore::new();
    let id = stored_campaign(&mut store);
    let mut campaign = reload_campaign(&store, id);

    let question_id = store
        .find_first_by(&catalog::QUESTION, &crate::db::Filter::new().eq("name", "Colour"))
        .expect("find should succeed")
        .and_then(|q| q.id())
        .expect("question should exist");

    let payload = AttributeMap::new()
        .with("id", question_id)
        .with("name", "Favourite colour")
        .with("mandatory", "1");
    let out = reconcile(&store, &mut campaign, "questions", attrs(vec![payload]))
        .expect("reconcile should succeed");

    let questions = campaign.records("questions");
    assert_eq!(questions.len(), 1);
    assert_eq!(out, [questions[0].handle()]);
    assert_eq!(questions[0].name(), Some("Favourite colour"));
    assert_eq!(questions[0].get("mandatory"), &Value::Bool(true));
}

#[test]
fn items_without_id_always_append() {
    let mut campaign = named(&catalog::CAMPAIGN, "New");
    let store = MemoryStore::new();

    reconcile(&store, &mut campaign, "tags", attrs(vec![name_attrs("a")]))
        .expect("reconcile should succeed");
    reconcile(&store, &mut campaign, "tags", attrs(vec![name_attrs("a")]))
        .expect("reconcile should succeed");

    assert_eq!(campaign.records("tags").len(), 2);
}

#[test]
fn unknown_id_creates_and_keeps_the_id() {
    let mut campaign = named(&catalog::CAMPAIGN, "New");
    let store = MemoryStore::new();

    let payload = AttributeMap::new().with("id", 99).with("name", "Size");
    reconcile(&store, &mut campaign, "questions", attrs(vec![payload.clone()]))
        .expect("reconcile should succeed");
    assert_eq!(campaign.records("questions")[0].id(), Some(RecordId::new(99)));

    // a later item with the same id now matches the record created above
    let renamed = payload.with("name", "Shoe size");
    reconcile(&store, &mut campaign, "questions", attrs(vec![renamed]))
        .expect("reconcile should succeed");
    let questions = campaign.records("questions");
    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0].name(), Some("Shoe size"));
}

#[test]
fn miss_after_hit_does_not_reuse_the_earlier_match() {
    let mut campaign = named(&catalog::CAMPAIGN, "New");
    let store = MemoryStore::new();
    reconcile(
        &store,
        &mut campaign,
        "tags",
        attrs(vec![AttributeMap::new().with("id", 1).with("name", "one")]),
    )
    .expect("reconcile should succeed");

    let out = reconcile(
        &store,
        &mut campaign,
        "tags",
        attrs(vec![
            AttributeMap::new().with("id", 1).with("name", "uno"),
            AttributeMap::new().with("id", 2).with("name", "two"),
        ]),
    )
    .expect("reconcile should succeed");

    let tags = campaign.records("tags");
    assert_eq!(tags.len(), 2);
    assert_eq!(tags[0].name(), Some("uno"));
    assert_eq!(tags[1].name(), Some("two"));
    assert_ne!(out[0], out[1]);
}

#[test]
fn nested_keys_populate_recursively() {
    let mut campaign = named(&catalog::CAMPAIGN, "New");
    let store = MemoryStore::new();

    let question = name_attrs("Colour").with_nested(
        "options",
        attrs(vec![name_attrs("Red"), name_attrs("Blue")]),
    );
    reconcile(&store, &mut campaign, "questions", attrs(vec![question]))
        .expect("reconcile should succeed");

    let question = &campaign.records("questions")[0];
    let options: Vec<_> = question
        .records("options")
        .iter()
        .filter_map(Record::name)
        .collect();
    assert_eq!(options, ["Red", "Blue"]);
}

#[test]
fn nested_keys_reach_stored_children() {
    let mut store = MemoryStore::new();
    let id = stored_campaign(&mut store);
    let mut campaign = reload_campaign(&store, id);
    let question_id = store
        .find_first_by(&catalog::QUESTION, &crate::db::Filter::new().eq("name", "Colour"))
        .expect("find should succeed")
        .and_then(|q| q.id())
        .expect("question should exist");

    let payload = AttributeMap::new()
        .with("id", question_id)
        .with_nested("options", attrs(vec![name_attrs("Green")]));
    reconcile(&store, &mut campaign, "questions", attrs(vec![payload]))
        .expect("reconcile should succeed");

    assert_eq!(campaign.records("questions")[0].records("options").len(), 3);

    save_graph(&mut store, &mut campaign).expect("save should succeed");
    assert_eq!(store.count(&catalog::OPTION), 3);
    assert_eq!(store.count(&catalog::QUESTION), 1);
}

#[test]
fn ready_built_records_attach_once() {
    let mut campaign = named(&catalog::CAMPAIGN, "New");
    let store = MemoryStore::new();
    let tag = named(&catalog::TAG, "vip");

    let first = reconcile(&store, &mut campaign, "tags", vec![Payload::from(tag.clone())])
        .expect("reconcile should succeed");
    let second = reconcile(&store, &mut campaign, "tags", vec![Payload::from(tag)])
        .expect("reconcile should succeed");

    assert_eq!(first, second);
    assert_eq!(campaign.records("tags").len(), 1);
}

#[test]
fn belongs_to_replaces_the_reference() {
    let mut campaign = named(&catalog::CAMPAIGN, "New");
    let store = MemoryStore::new();

    reconcile(&store, &mut campaign, "client", attrs(vec![name_attrs("Acme")]))
        .expect("reconcile should succeed");
    reconcile(&store, &mut campaign, "client", attrs(vec![name_attrs("Globex")]))
        .expect("reconcile should succeed");

    let client = campaign.records("client");
    assert_eq!(client.len(), 1);
    assert_eq!(client[0].name(), Some("Globex"));
}

#[test]
fn errors_carry_the_item_path() {
    let mut campaign = named(&catalog::CAMPAIGN, "New");
    let store = MemoryStore::new();

    let question = name_attrs("Colour").with_nested(
        "options",
        attrs(vec![name_attrs("Red"), name_attrs("Blue").with("colour", "x")]),
    );
    let err = reconcile(
        &store,
        &mut campaign,
        "questions",
        attrs(vec![name_attrs("Ok"), question]),
    )
    .expect_err("unknown attribute should fail");

    assert_eq!(err.path(), Some("questions[1].options[1]"));
    assert!(matches!(
        err.leaf(),
        ReconcileError::Record(RecordError::UnknownAttribute { attribute, .. }) if attribute == "colour"
    ));
}

#[test]
fn shape_errors_are_reported() {
    let mut campaign = named(&catalog::CAMPAIGN, "New");
    let store = MemoryStore::new();

    let err = reconcile(
        &store,
        &mut campaign,
        "questions",
        attrs(vec![name_attrs("Colour").with("options", "Red")]),
    )
    .expect_err("scalar under association should fail");
    assert_eq!(err.path(), Some("questions[0].options"));

    let err = reconcile(
        &store,
        &mut campaign,
        "tags",
        attrs(vec![name_attrs("x").with_nested("labels", Vec::new())]),
    )
    .expect_err("nested under plain key should fail");
    assert!(matches!(err.leaf(), ReconcileError::Record(_)));

    let err = reconcile(&store, &mut campaign, "widgets", Vec::new())
        .expect_err("undeclared association should fail");
    assert!(matches!(err, ReconcileError::UnknownAssociation { .. }));

    let err = reconcile(
        &store,
        &mut campaign,
        "tags",
        vec![Payload::from(named(&catalog::FIELD, "Email"))],
    )
    .expect_err("wrong record type should fail");
    assert!(matches!(err.leaf(), ReconcileError::InvalidShape { .. }));
}

#[test]
fn reconcile_emits_a_metrics_event() {
    #[derive(Default)]
    struct Capture(RefCell<Vec<MetricsEvent>>);

    impl MetricsSink for Capture {
        fn record(&self, event: MetricsEvent) {
            self.0.borrow_mut().push(event);
        }
    }

    let sink = Rc::new(Capture::default());
    let mut campaign = named(&catalog::CAMPAIGN, "New");
    let store = MemoryStore::new();

    with_metrics_sink(sink.clone(), || {
        reconcile(
            &store,
            &mut campaign,
            "tags",
            attrs(vec![name_attrs("a"), name_attrs("b")]),
        )
        .expect("reconcile should succeed");
    });

    assert_eq!(
        sink.0.borrow().as_slice(),
        [MetricsEvent::Reconciled {
            entity: "tag",
            created: 2,
            updated: 0,
            attached: 0,
        }]
    );
}

proptest! {
    #[test]
    fn id_free_items_grow_the_collection_by_their_count(names in prop::collection::vec("[a-z]{1,8}", 0..12)) {
        let mut campaign = named(&catalog::CAMPAIGN, "Prop");
        let store = MemoryStore::new();
        let items = attrs(names.iter().map(|n| name_attrs(n)).collect());

        let out = reconcile(&store, &mut campaign, "tags", items)
            .expect("reconcile should succeed");

        prop_assert_eq!(out.len(), names.len());
        prop_assert_eq!(campaign.records("tags").len(), names.len());
    }
}
