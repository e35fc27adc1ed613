use crate::model::{association::AssociationModel, field::EntityFieldModel};
use std::fmt;

///
/// EntityModel
/// Static runtime model for one entity.
///
/// The ordered association list is the only source consulted when a
/// payload key is classified as nested; nothing is discovered by
/// inspecting live records.
///

pub struct EntityModel {
    /// Fully-qualified path (for diagnostics).
    pub path: &'static str,
    /// Stable external name used in stores and error messages.
    pub entity_name: &'static str,
    /// Ordered field list; the first entry is the primary key.
    pub fields: &'static [EntityFieldModel],
    /// Declared nested associations, in declaration order.
    pub associations: &'static [AssociationModel],
}

impl EntityModel {
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&'static EntityFieldModel> {
        self.fields.iter().find(|f| f.name == name)
    }

    #[must_use]
    pub fn association(&self, name: &str) -> Option<&'static AssociationModel> {
        self.associations.iter().find(|a| a.name == name)
    }

    #[must_use]
    pub fn is_association(&self, name: &str) -> bool {
        self.association(name).is_some()
    }

    pub fn association_names(&self) -> impl Iterator<Item = &'static str> {
        self.associations.iter().map(|a| a.name)
    }

    /// True when the model stamps `created_at`/`updated_at` on save.
    #[must_use]
    pub fn has_timestamps(&self) -> bool {
        self.field("created_at").is_some() && self.field("updated_at").is_some()
    }
}

impl PartialEq for EntityModel {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for EntityModel {}

impl fmt::Debug for EntityModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityModel({})", self.entity_name)
    }
}
