use crate::model::entity::EntityModel;
use std::fmt;

///
/// AssociationKind
///
/// `BelongsTo` keeps the foreign key on the owner and is reassigned
/// wholesale; `HasMany` keeps it on each child and only ever accumulates.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AssociationKind {
    BelongsTo,
    HasMany,
}

///
/// AssociationModel
/// Declared nested collection on an entity.
///

pub struct AssociationModel {
    /// Payload key and accessor name.
    pub name: &'static str,
    /// Entity model of the records held by this association.
    pub target: &'static EntityModel,
    pub kind: AssociationKind,
    /// Foreign key attribute; lives on the child for `HasMany` and on the
    /// owner for `BelongsTo`.
    pub foreign_key: &'static str,
}

impl AssociationModel {
    #[must_use]
    pub const fn has_many(
        name: &'static str,
        target: &'static EntityModel,
        foreign_key: &'static str,
    ) -> Self {
        Self {
            name,
            target,
            kind: AssociationKind::HasMany,
            foreign_key,
        }
    }

    #[must_use]
    pub const fn belongs_to(
        name: &'static str,
        target: &'static EntityModel,
        foreign_key: &'static str,
    ) -> Self {
        Self {
            name,
            target,
            kind: AssociationKind::BelongsTo,
            foreign_key,
        }
    }

    #[must_use]
    pub const fn is_to_one(&self) -> bool {
        matches!(self.kind, AssociationKind::BelongsTo)
    }
}

impl fmt::Debug for AssociationModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssociationModel")
            .field("name", &self.name)
            .field("target", &self.target.entity_name)
            .field("kind", &self.kind)
            .field("foreign_key", &self.foreign_key)
            .finish()
    }
}
