use crate::{validator::Validator, value::Value, visitor::VisitorContext};

///
/// WordCount
/// Minimum number of whitespace-separated words.
///
/// Blank values are left to `Presence`; a word count rule on its own
/// still reports them as too short.
///

#[derive(Clone, Debug)]
pub struct WordCount {
    min: usize,
    message: Option<String>,
}

impl WordCount {
    #[must_use]
    pub const fn new(min: usize) -> Self {
        Self { min, message: None }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    #[must_use]
    pub const fn min(&self) -> usize {
        self.min
    }
}

impl Validator<Value> for WordCount {
    fn validate(&self, value: &Value, ctx: &mut dyn VisitorContext) {
        let text = value.to_text();
        let words = text.split_whitespace().count();

        if words < self.min {
            match &self.message {
                Some(message) => ctx.issue(message.clone()),
                None => ctx.issue(format!(
                    "is too short ({words} words, minimum is {})",
                    self.min
                )),
            }
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

    fn count_issues(rule: &WordCount, text: &str) -> usize {
        let mut ctx = IssueCollector::new();
        rule.validate(&Value::from(text), &mut ctx);
        ctx.into_issues().count()
    }

    #[test]
    fn counts_whitespace_separated_words() {
        let rule = WordCount::new(3);

        assert_eq!(count_issues(&rule, "love it"), 1);
        assert_eq!(count_issues(&rule, "  love   it   lots "), 0);
        assert_eq!(count_issues(&rule, ""), 1);
    }

    #[test]
    fn default_message_reports_counts() {
        let mut ctx = IssueCollector::new();
        WordCount::new(2).validate(&Value::from("one"), &mut ctx);

        assert_eq!(
            ctx.into_issues().at(""),
            ["is too short (1 words, minimum is 2)"]
        );
    }
}
