//! Validation message lookup.
//!
//! The engine asks a [`MessageProvider`] for every message it attaches to
//! a rule and treats the answer as opaque text. Localization lives behind
//! the trait; [`DefaultMessages`] is the built-in English set.

use crate::schema::FieldDef;

///
/// MessageKind
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MessageKind {
    /// Email address malformed.
    EmailFormat,

    /// Checkbox with a multi-word label left unticked.
    MandatoryCheckbox,

    /// Required input with a multi-word label left blank.
    MandatoryGeneric,

    /// Required single-word input; `subject` is the article-prefixed,
    /// lowercased label (`"an email"`).
    MandatoryField { subject: String },

    /// Landing-page question left blank.
    MandatoryQuestion,

    /// Long answer shorter than `min` words.
    WordCount { min: usize },
}

impl MessageKind {
    /// Pick the mandatory message for a field from its label shape.
    #[must_use]
    pub fn mandatory_for(def: &FieldDef) -> Self {
        if def.is_multi_word() {
            if def.is_checkbox() {
                Self::MandatoryCheckbox
            } else {
                Self::MandatoryGeneric
            }
        } else {
            Self::MandatoryField {
                subject: with_article(&def.label.to_lowercase()),
            }
        }
    }
}

///
/// MessageProvider
///

pub trait MessageProvider {
    fn message(&self, kind: &MessageKind) -> String;
}

///
/// DefaultMessages
///

#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultMessages;

impl MessageProvider for DefaultMessages {
    fn message(&self, kind: &MessageKind) -> String {
        match kind {
            MessageKind::EmailFormat => "Please enter a valid email address".to_string(),
            MessageKind::MandatoryCheckbox => "Please tick the box to continue".to_string(),
            MessageKind::MandatoryGeneric => "This field is required".to_string(),
            MessageKind::MandatoryField { subject } => format!("Please enter {subject}"),
            MessageKind::MandatoryQuestion => "Please answer this question".to_string(),
            MessageKind::WordCount { min } => format!("Please write at least {min} words"),
        }
    }
}

fn with_article(noun: &str) -> String {
    let article = match noun.chars().next() {
        Some('a' | 'e' | 'i' | 'o' | 'u') => "an",
        _ => "a",
    };

    format!("{article} {noun}")
}

///
/// TESTS
///
