use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured runtime error with a stable internal classification.
/// Not a stable API; intended for internal use and may change without notice.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl InternalError {
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
        }
    }

    /// Construct a store-origin not-found error for one entity id.
    pub fn store_not_found(entity: &str, key: impl fmt::Display) -> Self {
        Self::new(
            ErrorClass::NotFound,
            ErrorOrigin::Store,
            format!("{entity} not found: {key}"),
        )
    }

    /// Construct a store-origin internal error.
    pub fn store_internal(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Internal, ErrorOrigin::Store, message)
    }

    /// Construct a store-origin conflict error.
    pub fn store_conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Conflict, ErrorOrigin::Store, message)
    }

    /// Construct a store-origin invariant violation.
    pub fn store_invariant(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::InvariantViolation, ErrorOrigin::Store, message)
    }

    /// Construct a record-origin invariant violation.
    pub(crate) fn record_invariant(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::InvariantViolation, ErrorOrigin::Record, message)
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.class, ErrorClass::NotFound)
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

///
/// ErrorClass
/// Internal error taxonomy for runtime classification.
/// Not a stable API; may change without notice.
///

#[remain::sorted]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    Conflict,
    Internal,
    InvariantViolation,
    NotFound,
    Unsupported,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Conflict => "conflict",
            Self::Internal => "internal",
            Self::InvariantViolation => "invariant_violation",
            Self::NotFound => "not_found",
            Self::Unsupported => "unsupported",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Internal origin taxonomy for runtime classification.
/// Not a stable API; may change without notice.
///

#[remain::sorted]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Interface,
    Payload,
    Reconcile,
    Record,
    Store,
    Validate,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Interface => "interface",
            Self::Payload => "payload",
            Self::Reconcile => "reconcile",
            Self::Record => "record",
            Self::Store => "store",
            Self::Validate => "validate",
        };
        write!(f, "{label}")
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_with_class_prefixes_origin_and_class() {
        let err = InternalError::store_not_found("campaign", 7);

        assert!(err.is_not_found());
        assert_eq!(
            err.display_with_class(),
            "store:not_found: campaign not found: 7"
        );
    }
}
