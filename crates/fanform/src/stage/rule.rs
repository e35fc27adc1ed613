use crate::stage::{Stage, engine::AnswerSource};
use fanform_core::{
    validator::Validator,
    value::Value,
    visitor::{PathSegment, ScopedContext, VisitorContext},
};
use std::fmt;

///
/// StageRule
///
/// One validator bound to an answer key and the stage it guards.
/// When `unless` names a key whose answer is truthy, the rule is skipped.
///

pub struct StageRule {
    pub stage: Stage,
    pub key: String,
    pub unless: Option<&'static str>,
    validator: Box<dyn Validator<Value> + Send + Sync>,
}

impl StageRule {
    pub fn new(
        stage: Stage,
        key: impl Into<String>,
        validator: impl Validator<Value> + Send + Sync + 'static,
    ) -> Self {
        Self {
            stage,
            key: key.into(),
            unless: None,
            validator: Box::new(validator),
        }
    }

    #[must_use]
    pub const fn unless(mut self, key: &'static str) -> Self {
        self.unless = Some(key);
        self
    }

    pub(crate) fn check(&self, answers: &dyn AnswerSource, ctx: &mut dyn VisitorContext) {
        if let Some(skip) = self.unless
            && answers.answer(skip).to_bool()
        {
            return;
        }

        let value = answers.answer(&self.key);
        let mut scoped = ScopedContext::new(ctx, PathSegment::from(self.key.as_str()));
        self.validator.validate(&value, &mut scoped);
    }
}

impl fmt::Debug for StageRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageRule")
            .field("stage", &self.stage)
            .field("key", &self.key)
            .field("unless", &self.unless)
            .finish_non_exhaustive()
    }
}
