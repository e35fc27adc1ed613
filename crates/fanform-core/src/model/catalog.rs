//! Entity catalog for the campaign aggregate.
//!
//! Every campaign-owned collection keys back to its campaign through
//! `campaign_id`; consumer-owned collections through `consumer_id`.

use crate::model::{
    association::AssociationModel,
    entity::EntityModel,
    field::{EntityFieldModel, FieldKind},
};

///
/// Campaign
///

pub static CAMPAIGN: EntityModel = EntityModel {
    path: "fanform::campaign::Campaign",
    entity_name: "campaign",
    fields: &[
        EntityFieldModel::new("id", FieldKind::Id),
        EntityFieldModel::required("name", FieldKind::Text),
        EntityFieldModel::new("slug", FieldKind::Text),
        EntityFieldModel::new("client_id", FieldKind::Id),
        EntityFieldModel::new("created_at", FieldKind::Timestamp),
        EntityFieldModel::new("updated_at", FieldKind::Timestamp),
    ],
    associations: &[
        AssociationModel::belongs_to("client", &CLIENT, "client_id"),
        AssociationModel::has_many("templates", &TEMPLATE, "campaign_id"),
        AssociationModel::has_many("questions", &QUESTION, "campaign_id"),
        AssociationModel::has_many("answers", &ANSWER, "campaign_id"),
        AssociationModel::has_many("contents", &CONTENT, "campaign_id"),
        AssociationModel::has_many("options", &OPTION, "campaign_id"),
        AssociationModel::has_many("fields", &FIELD, "campaign_id"),
        AssociationModel::has_many("statuses", &STATUS, "campaign_id"),
        AssociationModel::has_many("tags", &TAG, "campaign_id"),
        AssociationModel::has_many("subscriptions", &SUBSCRIPTION, "campaign_id"),
        AssociationModel::has_many("consumers", &CONSUMER, "campaign_id"),
    ],
};

///
/// Client
///

pub static CLIENT: EntityModel = EntityModel {
    path: "fanform::campaign::Client",
    entity_name: "client",
    fields: &[
        EntityFieldModel::new("id", FieldKind::Id),
        EntityFieldModel::required("name", FieldKind::Text),
    ],
    associations: &[],
};

///
/// Template
///

pub static TEMPLATE: EntityModel = EntityModel {
    path: "fanform::campaign::Template",
    entity_name: "template",
    fields: &[
        EntityFieldModel::new("id", FieldKind::Id),
        EntityFieldModel::new("campaign_id", FieldKind::Id),
        EntityFieldModel::new("client_id", FieldKind::Id),
        EntityFieldModel::new("name", FieldKind::Text),
        EntityFieldModel::new("body", FieldKind::LongText),
    ],
    associations: &[],
};

///
/// Question
///

pub static QUESTION: EntityModel = EntityModel {
    path: "fanform::campaign::Question",
    entity_name: "question",
    fields: &[
        EntityFieldModel::new("id", FieldKind::Id),
        EntityFieldModel::new("campaign_id", FieldKind::Id),
        EntityFieldModel::required("name", FieldKind::Text),
        EntityFieldModel::new("data_type", FieldKind::Text),
        EntityFieldModel::new("mandatory", FieldKind::Bool),
        EntityFieldModel::new("position", FieldKind::Int),
    ],
    associations: &[
        AssociationModel::has_many("options", &OPTION, "question_id"),
        AssociationModel::has_many("answers", &ANSWER, "question_id"),
    ],
};

///
/// Answer
///

pub static ANSWER: EntityModel = EntityModel {
    path: "fanform::campaign::Answer",
    entity_name: "answer",
    fields: &[
        EntityFieldModel::new("id", FieldKind::Id),
        EntityFieldModel::new("campaign_id", FieldKind::Id),
        EntityFieldModel::new("question_id", FieldKind::Id),
        EntityFieldModel::new("consumer_id", FieldKind::Id),
        EntityFieldModel::new("value", FieldKind::LongText),
    ],
    associations: &[],
};

///
/// Content
///

pub static CONTENT: EntityModel = EntityModel {
    path: "fanform::campaign::Content",
    entity_name: "content",
    fields: &[
        EntityFieldModel::new("id", FieldKind::Id),
        EntityFieldModel::new("campaign_id", FieldKind::Id),
        EntityFieldModel::required("name", FieldKind::Text),
        EntityFieldModel::new("body", FieldKind::LongText),
        EntityFieldModel::new("position", FieldKind::Int),
    ],
    associations: &[],
};

///
/// Option
/// A selectable choice; owned by the campaign and optionally by a question.
///

pub static OPTION: EntityModel = EntityModel {
    path: "fanform::campaign::Option",
    entity_name: "option",
    fields: &[
        EntityFieldModel::new("id", FieldKind::Id),
        EntityFieldModel::new("campaign_id", FieldKind::Id),
        EntityFieldModel::new("question_id", FieldKind::Id),
        EntityFieldModel::required("name", FieldKind::Text),
        EntityFieldModel::new("value", FieldKind::Text),
    ],
    associations: &[],
};

///
/// Field
///

pub static FIELD: EntityModel = EntityModel {
    path: "fanform::campaign::Field",
    entity_name: "field",
    fields: &[
        EntityFieldModel::new("id", FieldKind::Id),
        EntityFieldModel::new("campaign_id", FieldKind::Id),
        EntityFieldModel::required("name", FieldKind::Text),
        EntityFieldModel::new("data_type", FieldKind::Text),
        EntityFieldModel::new("mandatory", FieldKind::Bool),
        EntityFieldModel::new("position", FieldKind::Int),
    ],
    associations: &[],
};

///
/// Status
///

pub static STATUS: EntityModel = EntityModel {
    path: "fanform::campaign::Status",
    entity_name: "status",
    fields: &[
        EntityFieldModel::new("id", FieldKind::Id),
        EntityFieldModel::new("campaign_id", FieldKind::Id),
        EntityFieldModel::required("name", FieldKind::Text),
    ],
    associations: &[],
};

///
/// Tag
///

pub static TAG: EntityModel = EntityModel {
    path: "fanform::campaign::Tag",
    entity_name: "tag",
    fields: &[
        EntityFieldModel::new("id", FieldKind::Id),
        EntityFieldModel::new("campaign_id", FieldKind::Id),
        EntityFieldModel::required("name", FieldKind::Text),
    ],
    associations: &[],
};

///
/// Subscription
///

pub static SUBSCRIPTION: EntityModel = EntityModel {
    path: "fanform::campaign::Subscription",
    entity_name: "subscription",
    fields: &[
        EntityFieldModel::new("id", FieldKind::Id),
        EntityFieldModel::new("campaign_id", FieldKind::Id),
        EntityFieldModel::required("name", FieldKind::Text),
        EntityFieldModel::new("list_reference", FieldKind::Text),
    ],
    associations: &[],
};

///
/// Consumer
/// One campaign participant; native columns shadow same-named schema fields.
///

pub static CONSUMER: EntityModel = EntityModel {
    path: "fanform::campaign::Consumer",
    entity_name: "consumer",
    fields: &[
        EntityFieldModel::new("id", FieldKind::Id),
        EntityFieldModel::new("campaign_id", FieldKind::Id),
        EntityFieldModel::new("status_id", FieldKind::Id),
        EntityFieldModel::new("name", FieldKind::Text),
        EntityFieldModel::new("email", FieldKind::Email),
        EntityFieldModel::new("facebook_identifier", FieldKind::Text),
        EntityFieldModel::new("facebook_access_token", FieldKind::Text),
        EntityFieldModel::new("facebook_access_token_expiry", FieldKind::Timestamp),
        EntityFieldModel::new("created_at", FieldKind::Timestamp),
        EntityFieldModel::new("updated_at", FieldKind::Timestamp),
    ],
    associations: &[
        AssociationModel::belongs_to("status", &STATUS, "status_id"),
        AssociationModel::has_many("details", &DETAIL, "consumer_id"),
        AssociationModel::has_many("answers", &ANSWER, "consumer_id"),
    ],
};

///
/// Detail
/// Generic name/value answer for a schema field with no native column.
///

pub static DETAIL: EntityModel = EntityModel {
    path: "fanform::campaign::Detail",
    entity_name: "detail",
    fields: &[
        EntityFieldModel::new("id", FieldKind::Id),
        EntityFieldModel::new("consumer_id", FieldKind::Id),
        EntityFieldModel::required("name", FieldKind::Text),
        EntityFieldModel::new("value", FieldKind::LongText),
    ],
    associations: &[],
};

/// Every entity in the catalog, parents before children.
pub static ALL: [&EntityModel; 13] = [
    &CAMPAIGN,
    &CLIENT,
    &TEMPLATE,
    &QUESTION,
    &ANSWER,
    &CONTENT,
    &OPTION,
    &FIELD,
    &STATUS,
    &TAG,
    &SUBSCRIPTION,
    &CONSUMER,
    &DETAIL,
];

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_entity_starts_with_its_primary_key() {
        for model in ALL {
            let pk = model.fields.first().expect("model should declare fields");
            assert_eq!(pk.name, "id", "{}", model.entity_name);
            assert!(pk.kind.is_key());
        }
    }

    #[test]
    fn foreign_keys_are_declared_where_they_live() {
        for model in ALL {
            for assoc in model.associations {
                let holder = if assoc.is_to_one() { model } else { assoc.target };
                let fk = holder.field(assoc.foreign_key).unwrap_or_else(|| {
                    panic!(
                        "{}.{} foreign key {} missing on {}",
                        model.entity_name, assoc.name, assoc.foreign_key, holder.entity_name
                    )
                });
                assert!(fk.kind.is_key());
            }
        }
    }

    #[test]
    fn entity_names_are_unique() {
        let mut names: Vec<_> = ALL.iter().map(|m| m.entity_name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ALL.len());
    }
}
