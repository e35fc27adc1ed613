use super::*;
use crate::{model::catalog, test_fixtures::named};

#[test]
fn set_coerces_and_null_clears() {
    let mut question = Record::new(&catalog::QUESTION);

    question.set("position", "3").expect("set should succeed");
    assert_eq!(question.get("position"), &Value::Int(3));

    question.set("position", Value::Null).expect("clear should succeed");
    assert!(question.get("position").is_null());
    assert_eq!(question.attributes().count(), 0);
}

#[test]
fn set_rejects_unknown_and_uncoercible_values() {
    let mut question = Record::new(&catalog::QUESTION);

    let err = question.set("colour", "red").expect_err("unknown attribute should fail");
    assert_eq!(
        err,
        RecordError::UnknownAttribute {
            entity: "question",
            attribute: "colour".to_string(),
        }
    );

    let err = question
        .set("position", "third")
        .expect_err("text position should fail");
    assert!(matches!(err, RecordError::InvalidValue { .. }));
}

#[test]
fn new_records_have_loaded_associations() {
    let campaign = Record::new(&catalog::CAMPAIGN);

    assert!(!campaign.is_persisted());
    assert!(campaign.id().is_none());
    assert!(campaign.associations().all(Association::is_loaded));
    assert!(campaign.records("questions").is_empty());
    assert!(campaign.records("nonsense").is_empty());
}

#[test]
fn stored_rows_start_unloaded() {
    let mut row = BTreeMap::new();
    row.insert("name".to_string(), Value::from("Stored"));
    let campaign = Record::from_row(&catalog::CAMPAIGN, RecordId::new(5), row)
        .expect("row should materialize");

    assert!(campaign.is_persisted());
    assert_eq!(campaign.id(), Some(RecordId::new(5)));
    assert!(campaign.associations().all(|a| !a.is_loaded()));
    assert!(!campaign.to_row().contains_key("id"));
}

#[test]
fn by_name_returns_first_match() {
    let records = vec![
        named(&catalog::FIELD, "Email"),
        named(&catalog::FIELD, "Phone"),
        named(&catalog::FIELD, "Email"),
    ];

    let found = by_name(&records, "Email").expect("Email should be found");
    assert_eq!(found.handle(), records[0].handle());
    assert!(by_name(&records, "Fax").is_none());
}

#[test]
fn has_many_attach_ignores_duplicate_handles() {
    let mut campaign = Record::new(&catalog::CAMPAIGN);
    let tag = named(&catalog::TAG, "vip");
    let assoc = campaign.association_mut("tags").expect("tags should exist");

    assert_eq!(assoc.attach(tag.clone()), 0);
    assert_eq!(assoc.attach(tag), 0);
    assert_eq!(assoc.len(), 1);
}

#[test]
fn load_keeps_records_added_before_it() {
    let mut campaign = Record::from_row(&catalog::CAMPAIGN, RecordId::new(1), BTreeMap::new())
        .expect("row should materialize");
    let assoc = campaign.association_mut("tags").expect("tags should exist");

    assoc.attach(named(&catalog::TAG, "pending"));
    assoc.load(vec![named(&catalog::TAG, "stored")]);

    let names: Vec<_> = assoc.records().iter().filter_map(Record::name).collect();
    assert_eq!(names, ["stored", "pending"]);
    assert!(assoc.is_loaded());
}

#[test]
fn find_handle_searches_the_graph() {
    let mut campaign = named(&catalog::CAMPAIGN, "Root");
    let option = named(&catalog::OPTION, "Red");
    let handle = option.handle();

    let mut question = named(&catalog::QUESTION, "Colour");
    question
        .association_mut("options")
        .expect("options should exist")
        .attach(option);
    campaign
        .association_mut("questions")
        .expect("questions should exist")
        .attach(question);

    let found = campaign.find_handle(handle).expect("option should be found");
    assert_eq!(found.name(), Some("Red"));
}
