use crate::{validator::Validator, value::Value, visitor::VisitorContext};

///
/// Presence
///

#[derive(Clone, Debug, Default)]
pub struct Presence {
    message: Option<String>,
}

impl Presence {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }
}

impl Validator<Value> for Presence {
    fn validate(&self, value: &Value, ctx: &mut dyn VisitorContext) {
        if value.is_blank() {
            ctx.issue(self.message.as_deref().unwrap_or("can't be blank"));
        }
    }
}

///
/// Acceptance
/// Passes only when the value coerces to `true`; unset never passes.
///

#[derive(Clone, Debug, Default)]
pub struct Acceptance {
    message: Option<String>,
}

impl Acceptance {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }
}

impl Validator<Value> for Acceptance {
    fn validate(&self, value: &Value, ctx: &mut dyn VisitorContext) {
        if !value.to_bool() {
            ctx.issue(self.message.as_deref().unwrap_or("must be accepted"));
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visitor::IssueCollector;

    fn run(validator: &dyn Validator<Value>, value: Value) -> Vec<String> {
        let mut ctx = IssueCollector::new();
        validator.validate(&value, &mut ctx);
        ctx.into_issues().at("").to_vec()
    }

    #[test]
    fn presence_rejects_blank_text() {
        assert_eq!(run(&Presence::new(), Value::from("  ")), ["can't be blank"]);
        assert!(run(&Presence::new(), Value::from("x")).is_empty());
        assert!(run(&Presence::new(), Value::Bool(false)).is_empty());
    }

    #[test]
    fn acceptance_requires_truthy_value() {
        let rule = Acceptance::with_message("tick the box");

        assert_eq!(run(&rule, Value::Null), ["tick the box"]);
        assert_eq!(run(&rule, Value::from("0")), ["tick the box"]);
        assert!(run(&rule, Value::from("1")).is_empty());
        assert!(run(&rule, Value::Bool(true)).is_empty());
    }
}
