pub mod association;
pub mod catalog;
pub mod entity;
pub mod field;

pub use association::{AssociationKind, AssociationModel};
pub use entity::EntityModel;
pub use field::{EntityFieldModel, FieldKind};
