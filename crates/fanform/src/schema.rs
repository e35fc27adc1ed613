//! Read-only views of a campaign's dynamic form schema.
//!
//! Questions and fields are ordinary records; the views here give them a
//! typed `data_type`, a mandatory flag and a stable accessor key.

use fanform_core::{model::catalog, name::accessor_key, record::Record};
use serde::{Deserialize, Serialize};
use std::fmt;

///
/// DataType
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum DataType {
    CheckBox,
    Email,
    LongText,
    Text,
    Other(String),
}

impl DataType {
    /// Parse a stored `data_type`; case, spaces and separators are ignored
    /// (`"Long Text"`, `"long_text"` and `"long-text"` all read as `LongText`).
    /// Blank reads as `Text`.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        let normalized: String = s
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match normalized.as_str() {
            "" | "text" => Self::Text,
            "longtext" => Self::LongText,
            "checkbox" => Self::CheckBox,
            "email" => Self::Email,
            _ => Self::Other(s.trim().to_string()),
        }
    }

    /// Canonical snake-case label.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::CheckBox => "check_box",
            Self::Email => "email",
            Self::LongText => "long_text",
            Self::Text => "text",
            Self::Other(s) => s,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

///
/// FieldDef
/// One question or field, as the form sees it.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldDef {
    pub label: String,
    pub key: String,
    pub data_type: DataType,
    pub mandatory: bool,
}

impl FieldDef {
    /// View a question/field record. Records without a usable key
    /// (blank or symbol-only names) yield `None`.
    #[must_use]
    pub fn from_record(record: &Record) -> Option<Self> {
        let label = record.name()?.trim().to_string();
        let key = accessor_key(&label);
        if key.is_empty() {
            return None;
        }

        Some(Self {
            label,
            key,
            data_type: DataType::parse(&record.get("data_type").to_text()),
            mandatory: record.get("mandatory").to_bool(),
        })
    }

    #[must_use]
    pub fn is_checkbox(&self) -> bool {
        self.data_type == DataType::CheckBox
    }

    #[must_use]
    pub fn is_long_text(&self) -> bool {
        self.data_type == DataType::LongText
    }

    #[must_use]
    pub fn is_email(&self) -> bool {
        self.data_type == DataType::Email
    }

    /// The key names a consumer column rather than a detail row.
    #[must_use]
    pub fn is_native(&self) -> bool {
        catalog::CONSUMER
            .field(&self.key)
            .is_some_and(|field| !field.kind.is_key())
    }

    /// Labels of more than one word use the generic messages.
    #[must_use]
    pub fn is_multi_word(&self) -> bool {
        self.label.split_whitespace().count() > 1
    }
}

///
/// Schema
/// Ordered questions and fields of one campaign.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Schema {
    pub questions: Vec<FieldDef>,
    pub fields: Vec<FieldDef>,
}

impl Schema {
    #[must_use]
    pub fn new(questions: Vec<FieldDef>, fields: Vec<FieldDef>) -> Self {
        Self { questions, fields }
    }

    /// Build from question and field records, skipping keyless entries.
    #[must_use]
    pub fn from_records(questions: &[Record], fields: &[Record]) -> Self {
        Self {
            questions: questions.iter().filter_map(FieldDef::from_record).collect(),
            fields: fields.iter().filter_map(FieldDef::from_record).collect(),
        }
    }

    /// The question shown as the long answer on the landing page.
    #[must_use]
    pub fn long_answer_question(&self) -> Option<&FieldDef> {
        self.questions.iter().find(|q| q.is_long_text())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty() && self.fields.is_empty()
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use fanform_core::model::catalog;

    fn field(name: &str, data_type: &str, mandatory: bool) -> Record {
        let mut record = Record::new(&catalog::FIELD);
        record.set("name", name).expect("set should succeed");
        record.set("data_type", data_type).expect("set should succeed");
        record.set("mandatory", mandatory).expect("set should succeed");
        record
    }

    #[test]
    fn data_type_parsing_ignores_separators() {
        assert_eq!(DataType::parse("Long Text"), DataType::LongText);
        assert_eq!(DataType::parse("long_text"), DataType::LongText);
        assert_eq!(DataType::parse("check-box"), DataType::CheckBox);
        assert_eq!(DataType::parse("CheckBox"), DataType::CheckBox);
        assert_eq!(DataType::parse(""), DataType::Text);
        assert_eq!(DataType::parse("date"), DataType::Other("date".to_string()));
    }

    #[test]
    fn field_defs_carry_keys_and_flags() {
        let def = FieldDef::from_record(&field("Pet Name", "check_box", true))
            .expect("field should have a key");

        assert_eq!(def.key, "pet_name");
        assert!(def.is_checkbox());
        assert!(def.mandatory);
        assert!(def.is_multi_word());
    }

    #[test]
    fn keyless_records_are_skipped() {
        let schema = Schema::from_records(&[], &[field("???", "text", true), field("Email", "email", true)]);

        assert_eq!(schema.fields.len(), 1);
        assert_eq!(schema.fields[0].key, "email");
    }
}
