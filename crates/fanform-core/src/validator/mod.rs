//! Base validators over scalar [`Value`](crate::value::Value)s.
//!
//! Validators never fail hard; they report issues into the visitor context
//! they are handed and let the caller decide what a failure means.

mod presence;
mod text;
mod web;

pub use presence::{Acceptance, Presence};
pub use text::WordCount;
pub use web::EmailFormat;

use crate::visitor::VisitorContext;

///
/// Validator
///
/// Allows a rule to validate values.
///

pub trait Validator<T: ?Sized> {
    fn validate(&self, value: &T, ctx: &mut dyn VisitorContext);
}

impl<T: ?Sized, V: Validator<T> + ?Sized> Validator<T> for Box<V> {
    fn validate(&self, value: &T, ctx: &mut dyn VisitorContext) {
        (**self).validate(value, ctx);
    }
}
