///
/// EntityFieldModel
/// Runtime field metadata used by assignment, coercion and validation.
///

#[derive(Debug)]
pub struct EntityFieldModel {
    /// Field name as used in payloads, filters and rows.
    pub name: &'static str,
    /// Storage shape; incoming values are coerced into it.
    pub kind: FieldKind,
    /// Model-level presence requirement checked by record validation.
    pub required: bool,
}

impl EntityFieldModel {
    #[must_use]
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
        }
    }

    #[must_use]
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: true,
        }
    }
}

///
/// FieldKind
///
/// Minimal type surface for record attributes.
/// `Id` marks primary and foreign keys; they are never exposed as
/// schema accessors.
///

#[remain::sorted]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FieldKind {
    Bool,
    Email,
    Id,
    Int,
    LongText,
    Text,
    Timestamp,
}

impl FieldKind {
    #[must_use]
    pub const fn is_key(self) -> bool {
        matches!(self, Self::Id)
    }
}
