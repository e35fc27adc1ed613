use crate::{
    config::FormConfig,
    message::{MessageKind, MessageProvider},
    schema::{FieldDef, Schema},
    stage::{Stage, StageRule},
};
use fanform_core::{
    validator::{Acceptance, EmailFormat, Presence, WordCount},
    value::Value,
    visitor::{IssueCollector, Issues},
};
use std::collections::BTreeMap;
use tracing::debug;

///
/// AnswerSource
/// Read access to the answers being validated.
///

pub trait AnswerSource {
    /// Current answer for a key; unknown keys read as Null.
    fn answer(&self, key: &str) -> Value;
}

impl AnswerSource for BTreeMap<String, Value> {
    fn answer(&self, key: &str) -> Value {
        self.get(key).cloned().unwrap_or_default()
    }
}

///
/// StageEngine
///
/// Rule set synthesized once per schema. Evaluation is a pure function
/// of (rules, answers, stage).
///

#[derive(Debug)]
pub struct StageEngine {
    rules: Vec<StageRule>,
}

impl StageEngine {
    #[must_use]
    pub fn new(schema: &Schema, config: &FormConfig, messages: &dyn MessageProvider) -> Self {
        let mut rules = fixed_rules(messages);
        rules.extend(question_rules(schema, config, messages));
        rules.extend(field_rules(schema, config, messages));

        debug!(
            rules = rules.len(),
            questions = schema.questions.len(),
            fields = schema.fields.len(),
            "stage rules synthesized"
        );

        Self { rules }
    }

    #[must_use]
    pub fn rules(&self) -> &[StageRule] {
        &self.rules
    }

    pub fn rules_at(&self, stage: Stage) -> impl Iterator<Item = &StageRule> {
        self.rules.iter().filter(move |rule| rule.stage == stage)
    }

    /// Issues raised by the rules guarding one stage, keyed by answer key.
    #[must_use]
    pub fn validate_at(&self, answers: &dyn AnswerSource, stage: Stage) -> Issues {
        let mut collector = IssueCollector::new();
        for rule in self.rules_at(stage) {
            rule.check(answers, &mut collector);
        }

        collector.into_issues()
    }

    #[must_use]
    pub fn passes(&self, answers: &dyn AnswerSource, stage: Stage) -> bool {
        self.validate_at(answers, stage).is_empty()
    }

    /// First stage whose requirements are unmet; `Share` when all pass.
    #[must_use]
    pub fn current_stage(&self, answers: &dyn AnswerSource) -> Stage {
        Stage::ALL
            .into_iter()
            .find(|stage| !self.passes(answers, *stage))
            .unwrap_or(Stage::Share)
    }
}

fn fixed_rules(messages: &dyn MessageProvider) -> Vec<StageRule> {
    let generic = messages.message(&MessageKind::MandatoryGeneric);
    let email = messages.message(&MessageKind::EmailFormat);

    vec![
        StageRule::new(Stage::Likegate, "page_like", Acceptance::new()),
        StageRule::new(Stage::Login, "facebook_identifier", Presence::new())
            .unless("facebook_cancelled"),
        StageRule::new(Stage::Loggedin, "facebook_access_token", Presence::new())
            .unless("facebook_cancelled"),
        StageRule::new(Stage::Details, "name", Presence::with_message(generic.clone())),
        StageRule::new(Stage::Details, "email", Presence::with_message(generic)),
        StageRule::new(Stage::Details, "email", EmailFormat::with_message(email)),
    ]
}

// The first long-text question is the landing page's long answer.
fn question_rules(
    schema: &Schema,
    config: &FormConfig,
    messages: &dyn MessageProvider,
) -> Vec<StageRule> {
    let long_answer = schema.long_answer_question().map(|q| q.key.as_str());
    let mut rules = Vec::new();

    for question in &schema.questions {
        if Some(question.key.as_str()) == long_answer {
            let mandatory = messages.message(&MessageKind::mandatory_for(question));
            rules.push(StageRule::new(
                Stage::Landing,
                &question.key,
                Presence::with_message(mandatory),
            ));
            rules.push(word_count_rule(Stage::Landing, question, config, messages));
        } else {
            let mandatory = messages.message(&MessageKind::MandatoryQuestion);
            rules.push(StageRule::new(
                Stage::Landing,
                &question.key,
                Presence::with_message(mandatory),
            ));
        }
    }

    rules
}

// Fields backed by a native consumer column are covered by the fixed rules.
fn field_rules(
    schema: &Schema,
    config: &FormConfig,
    messages: &dyn MessageProvider,
) -> Vec<StageRule> {
    let mut rules = Vec::new();

    for field in schema.fields.iter().filter(|f| !f.is_native()) {
        let mandatory = messages.message(&MessageKind::mandatory_for(field));

        if field.mandatory && !field.is_checkbox() {
            rules.push(StageRule::new(
                Stage::Details,
                &field.key,
                Presence::with_message(mandatory.clone()),
            ));
        }
        if field.is_email() {
            rules.push(StageRule::new(
                Stage::Details,
                &field.key,
                EmailFormat::with_message(mandatory.clone()),
            ));
        }
        if field.mandatory && field.is_checkbox() {
            rules.push(StageRule::new(
                Stage::Details,
                &field.key,
                Acceptance::with_message(mandatory),
            ));
        }
        if field.is_long_text() {
            rules.push(word_count_rule(Stage::Details, field, config, messages));
        }
    }

    rules
}

fn word_count_rule(
    stage: Stage,
    def: &FieldDef,
    config: &FormConfig,
    messages: &dyn MessageProvider,
) -> StageRule {
    let min = config.min_word_count;
    let message = messages.message(&MessageKind::WordCount { min });

    StageRule::new(stage, &def.key, WordCount::new(min).with_message(message))
}
