use crate::schema::Schema;
use fanform_core::model::catalog;
use std::collections::BTreeMap;

/// Consumer columns every submission exposes, whatever the schema says.
pub const NATIVE_KEYS: [&str; 5] = [
    "name",
    "email",
    "facebook_identifier",
    "facebook_access_token",
    "facebook_access_token_expiry",
];

/// Answers that live only on the submission and are never stored.
pub const TRANSIENT_KEYS: [&str; 2] = ["page_like", "facebook_cancelled"];

///
/// Target
/// Where one accessor key reads and writes.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Target {
    /// A consumer column.
    Native(&'static str),

    /// A detail row named `label`; checkbox details read as booleans.
    Detail { label: String, checkbox: bool },

    /// Submission-only state.
    Transient,
}

///
/// AccessorTable
///
/// Key → target map built once from the schema. Questions and foreign
/// fields become detail rows; fields named like a consumer column route
/// to that column.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AccessorTable {
    entries: BTreeMap<String, Target>,
}

impl AccessorTable {
    #[must_use]
    pub fn build(schema: &Schema) -> Self {
        let mut entries = BTreeMap::new();

        for key in NATIVE_KEYS {
            if let Some(field) = catalog::CONSUMER.field(key) {
                entries.insert(key.to_string(), Target::Native(field.name));
            }
        }
        for key in TRANSIENT_KEYS {
            entries.insert(key.to_string(), Target::Transient);
        }

        for question in &schema.questions {
            entries
                .entry(question.key.clone())
                .or_insert_with(|| Target::Detail {
                    label: question.label.clone(),
                    checkbox: false,
                });
        }

        for field in &schema.fields {
            let target = match catalog::CONSUMER.field(&field.key) {
                Some(column) if field.is_native() => Target::Native(column.name),
                _ => Target::Detail {
                    label: field.label.clone(),
                    checkbox: field.is_checkbox(),
                },
            };
            entries.entry(field.key.clone()).or_insert(target);
        }

        Self { entries }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Target> {
        self.entries.get(key)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Target)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
