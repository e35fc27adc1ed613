use crate::{
    record::Record,
    validate::validate_fields,
    visitor::{Issues, Visitor, VisitorContext},
};
use thiserror::Error as ThisError;

///
/// ValidateError
///

#[derive(Debug, ThisError)]
pub enum ValidateError {
    #[error("validation failed")]
    ValidationFailed(Issues),

    #[error("invalid validator configuration: {0}")]
    InvalidConfig(String),
}

impl ValidateError {
    /// Issues carried by a failed validation; empty for config errors.
    #[must_use]
    pub fn issues(&self) -> Issues {
        match self {
            Self::ValidationFailed(issues) => issues.clone(),
            Self::InvalidConfig(_) => Issues::new(),
        }
    }
}

///
/// ValidateVisitor
///

#[derive(Debug, Default)]
pub struct ValidateVisitor;

impl ValidateVisitor {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Visitor<ValidateError> for ValidateVisitor {
    fn enter(&mut self, node: &Record, ctx: &mut dyn VisitorContext) -> Result<(), ValidateError> {
        validate_fields(node, ctx);

        Ok(())
    }

    fn exit(&mut self, _: &Record) -> Result<(), ValidateError> {
        Ok(())
    }
}
