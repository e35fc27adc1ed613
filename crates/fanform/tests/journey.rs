use fanform::{
    ErrorKind,
    campaign::CampaignFacade,
    config::FormConfig,
    core::{
        db::{Filter, MemoryStore},
        model::catalog,
        obs::{metrics_report, metrics_reset_all},
        value::Value,
    },
    message::DefaultMessages,
    stage::Stage,
    submission::Submission,
};
use serde_json::json;

fn campaign(store: &mut MemoryStore) -> CampaignFacade {
    CampaignFacade::create_json(
        store,
        &json!({
            "campaign": {"name": "Biggest Fan"},
            "questions": [
                {"name": "Why do you love us?", "data_type": "Long Text", "mandatory": true}
            ],
            "fields": [
                {"name": "Email", "data_type": "Email", "mandatory": true},
                {"name": "Subscribe", "data_type": "Check Box", "mandatory": true}
            ]
        }),
        FormConfig::default(),
    )
    .expect("campaign create should succeed")
}

#[test]
fn consumer_walks_every_stage() {
    let mut store = MemoryStore::new();
    let mut submission =
        Submission::new(campaign(&mut store), &DefaultMessages).expect("submission should build");
    assert_eq!(submission.stage(), Stage::Likegate);

    // like gate
    submission.set("page_like", true).expect("set should succeed");
    assert_eq!(submission.stage(), Stage::Landing);

    // a two-word answer is not enough
    submission.set_stage(Stage::Landing);
    submission
        .set("why_do_you_love_us", "love it")
        .expect("set should succeed");
    assert!(!submission.save(&mut store).expect("save should not error"));
    assert_eq!(
        submission.errors().at("why_do_you_love_us"),
        ["Please write at least 3 words"]
    );

    submission
        .set("why_do_you_love_us", "because you are great")
        .expect("set should succeed");
    assert!(submission.save(&mut store).expect("save should succeed"));
    assert_eq!(submission.declared_stage(), Some(Stage::Login));

    // social login
    submission
        .update(
            &mut store,
            [
                ("facebook_identifier", "fb-100"),
                ("facebook_access_token", "token"),
            ],
        )
        .expect("update should succeed");
    assert_eq!(submission.declared_stage(), Some(Stage::Details));

    // details: unticked checkbox holds the consumer back
    submission.set_stage(Stage::Details);
    submission
        .fill([("name", "Sam"), ("email", "sam@example.com")], false)
        .expect("fill should succeed");
    assert!(!submission.save(&mut store).expect("save should not error"));
    assert_eq!(
        submission.errors().at("subscribe"),
        ["Please enter a subscribe"]
    );

    submission.set("subscribe", "1").expect("set should succeed");
    assert!(submission.save(&mut store).expect("save should succeed"));
    assert_eq!(submission.declared_stage(), Some(Stage::Share));
    assert_eq!(submission.next_stage(), None);

    assert_eq!(store.count(&catalog::CONSUMER), 1);
    assert_eq!(store.count(&catalog::DETAIL), 2);
}

#[test]
fn cancelled_login_goes_straight_to_details() {
    let mut store = MemoryStore::new();
    let mut submission =
        Submission::new(campaign(&mut store), &DefaultMessages).expect("submission should build");

    submission
        .fill(
            [
                ("page_like", "1"),
                ("why_do_you_love_us", "because you are great"),
                ("facebook_cancelled", "true"),
            ],
            false,
        )
        .expect("fill should succeed");

    assert_eq!(submission.stage(), Stage::Details);
    assert_eq!(submission.previous_stage(), Some(Stage::Loggedin));
}

#[test]
fn returning_consumer_is_found_by_social_id() {
    let mut store = MemoryStore::new();
    let campaign_record = campaign(&mut store);
    let submission = Submission::create(
        &mut store,
        campaign_record.clone(),
        [
            ("page_like", Value::Bool(true)),
            ("why_do_you_love_us", Value::from("because you are great")),
            ("facebook_identifier", Value::from("fb-7")),
        ],
        &DefaultMessages,
    )
    .expect("create should succeed");
    assert!(submission.is_persisted());

    let returning = Submission::find_by(
        &store,
        campaign_record,
        &Filter::new().eq("facebook_identifier", "fb-7"),
        &DefaultMessages,
    )
    .expect("find should succeed");

    assert_eq!(returning.id(), submission.id());
    assert_eq!(returning.current_stage(), Stage::Likegate);
    assert_eq!(
        returning
            .get("why_do_you_love_us")
            .expect("get should succeed"),
        Value::from("because you are great")
    );
}

#[test]
fn unknown_answers_are_rejected_on_create() {
    let mut store = MemoryStore::new();
    let campaign = campaign(&mut store);
    let err = Submission::create(
        &mut store,
        campaign,
        [("shoe_size", "9")],
        &DefaultMessages,
    )
    .expect_err("unknown key should fail");

    assert!(matches!(err.kind, ErrorKind::UnknownAttribute));
    assert_eq!(store.count(&catalog::CONSUMER), 0);
}

#[test]
fn reconcile_and_save_are_counted() {
    metrics_reset_all();
    let mut store = MemoryStore::new();
    campaign(&mut store);

    let report = metrics_report();
    assert_eq!(report.ops.records_created, 3);
    assert!(report.ops.rows_saved >= 4);
    assert_eq!(report.ops.save_failures, 0);
}
