use crate::config::ConfigError;
use derive_more::Display;
use fanform_core::{
    db::SaveError,
    error::{ErrorClass, ErrorOrigin as CoreErrorOrigin, InternalError},
    payload::PayloadError,
    reconcile::ReconcileError,
    record::RecordError,
    visitor::{Issues, validate::ValidateError},
};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable kind + origin taxonomy.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
        }
    }

    pub(crate) fn not_found(origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, origin, message)
    }

    pub(crate) fn unknown_attribute(origin: ErrorOrigin, attribute: &str) -> Self {
        Self::new(
            ErrorKind::UnknownAttribute,
            origin,
            format!("unknown attribute '{attribute}'"),
        )
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.kind, ErrorKind::NotFound)
    }

    /// Validation issues, when this is a validation failure.
    #[must_use]
    pub const fn issues(&self) -> Option<&Issues> {
        match &self.kind {
            ErrorKind::ValidationFailed(issues) => Some(issues),
            _ => None,
        }
    }
}

impl From<InternalError> for Error {
    fn from(err: InternalError) -> Self {
        let kind = match err.class {
            ErrorClass::NotFound => ErrorKind::NotFound,
            _ => ErrorKind::Internal,
        };

        Self::new(kind, err.origin.into(), err.message)
    }
}

impl From<RecordError> for Error {
    fn from(err: RecordError) -> Self {
        let kind = match err {
            RecordError::UnknownAttribute { .. } => ErrorKind::UnknownAttribute,
            RecordError::InvalidValue { .. } => ErrorKind::InvalidPayload,
        };

        Self::new(kind, ErrorOrigin::Record, err.to_string())
    }
}

impl From<PayloadError> for Error {
    fn from(err: PayloadError) -> Self {
        Self::new(ErrorKind::InvalidPayload, ErrorOrigin::Payload, err.to_string())
    }
}

impl From<ReconcileError> for Error {
    fn from(err: ReconcileError) -> Self {
        let message = err.to_string();
        let (kind, origin) = match err.leaf() {
            ReconcileError::Record(RecordError::UnknownAttribute { .. }) => {
                (ErrorKind::UnknownAttribute, ErrorOrigin::Reconcile)
            }
            ReconcileError::Store(inner) => (Self::from(inner.clone()).kind, ErrorOrigin::Store),
            _ => (ErrorKind::InvalidPayload, ErrorOrigin::Reconcile),
        };

        Self::new(kind, origin, message)
    }
}

impl From<ValidateError> for Error {
    fn from(err: ValidateError) -> Self {
        match err {
            ValidateError::ValidationFailed(issues) => Self::new(
                ErrorKind::ValidationFailed(issues),
                ErrorOrigin::Validate,
                "validation failed",
            ),
            ValidateError::InvalidConfig(message) => {
                Self::new(ErrorKind::Config, ErrorOrigin::Validate, message)
            }
        }
    }
}

impl From<SaveError> for Error {
    fn from(err: SaveError) -> Self {
        Self::new(ErrorKind::Internal, ErrorOrigin::Store, err.to_string())
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::new(ErrorKind::Config, ErrorOrigin::Config, err.to_string())
    }
}

///
/// ErrorKind
/// Public error taxonomy for callers.
///

#[remain::sorted]
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ErrorKind {
    /// Configuration could not be read or is out of range.
    Config,

    /// The caller cannot remediate this.
    Internal,

    /// Payload shape or values could not be applied.
    InvalidPayload,

    /// Lookup matched no row.
    NotFound,

    /// Stored session state could not be fully re-resolved.
    RestoreFailure,

    /// A key names neither a declared attribute nor a schema accessor.
    UnknownAttribute,

    /// Issues keyed by attribute path.
    ValidationFailed(Issues),
}

///
/// ErrorOrigin
/// Public origin taxonomy for callers.
///

#[remain::sorted]
#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorOrigin {
    Campaign,
    Config,
    Interface,
    Payload,
    Reconcile,
    Record,
    Store,
    Submission,
    Validate,
}

impl From<CoreErrorOrigin> for ErrorOrigin {
    fn from(origin: CoreErrorOrigin) -> Self {
        match origin {
            CoreErrorOrigin::Interface => Self::Interface,
            CoreErrorOrigin::Payload => Self::Payload,
            CoreErrorOrigin::Reconcile => Self::Reconcile,
            CoreErrorOrigin::Record => Self::Record,
            CoreErrorOrigin::Store => Self::Store,
            CoreErrorOrigin::Validate => Self::Validate,
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_class_maps_to_not_found_kind() {
        let err = Error::from(InternalError::store_not_found("campaign", 9));

        assert!(err.is_not_found());
        assert_eq!(err.origin, ErrorOrigin::Store);
        assert_eq!(err.message, "campaign not found: 9");
    }

    #[test]
    fn reconcile_unknown_attribute_keeps_the_path() {
        let err = ReconcileError::from(RecordError::UnknownAttribute {
            entity: "option",
            attribute: "colour".to_string(),
        })
        .with_index(0)
        .with_field("options");

        let err = Error::from(err);
        assert_eq!(err.kind, ErrorKind::UnknownAttribute);
        assert!(err.message.contains("options[0]"));
    }
}
