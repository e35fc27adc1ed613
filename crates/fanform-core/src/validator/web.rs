use crate::{validator::Validator, value::Value, visitor::VisitorContext};

///
/// EmailFormat
///
/// Syntactic check only: one `@`, a non-empty local part, and a dotted
/// domain whose labels are alphanumeric or hyphenated. Blank values pass;
/// pair with `Presence` when the address is mandatory.
///

#[derive(Clone, Debug, Default)]
pub struct EmailFormat {
    message: Option<String>,
}

impl EmailFormat {
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

    #[must_use]
    pub fn is_valid(s: &str) -> bool {
        let Some((local, domain)) = s.split_once('@') else {
            return false;
        };

        if local.is_empty()
            || domain.contains('@')
            || local.chars().any(|c| c.is_whitespace() || c.is_control())
        {
            return false;
        }

        let labels: Vec<&str> = domain.split('.').collect();
        if labels.len() < 2 {
            return false;
        }

        labels.iter().all(|label| {
            !label.is_empty()
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
    }
}

impl Validator<Value> for EmailFormat {
    fn validate(&self, value: &Value, ctx: &mut dyn VisitorContext) {
        if value.is_blank() {
            return;
        }

        let text = value.to_text();
        let text = text.trim();
        if !Self::is_valid(text) {
            match &self.message {
                Some(message) => ctx.issue(message.clone()),
                None => ctx.issue(format!("email '{text}' is not a valid address")),
            }
        }
    }
}

///
/// TESTS
///
