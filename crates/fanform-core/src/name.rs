//! Name derivations shared by facades: accessor keys and slugs.

use convert_case::{Case, Casing};

pub use crate::record::{by_name, by_name_mut};

/// Snake-case accessor key for a schema label (`"Pet Name"` → `pet_name`).
///
/// Characters outside `[a-z0-9_]` are dropped; an empty result means the
/// label has no usable key.
#[must_use]
pub fn accessor_key(label: &str) -> String {
    label
        .trim()
        .to_case(Case::Snake)
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_')
        .collect::<String>()
        .trim_matches('_')
        .to_string()
}

/// URL slug for a campaign name: lowercase ASCII alphanumerics only
/// (`"Biggest Fan 2024!"` → `biggestfan2024`).
#[must_use]
pub fn slugify(name: &str) -> String {
    name.trim()
        .to_case(Case::Kebab)
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

///
/// TESTS
///
