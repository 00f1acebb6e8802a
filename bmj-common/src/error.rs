//! Common error types for BMJ

use thiserror::Error;

/// Common result type for BMJ operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the BMJ crates
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Input rejected before any persistence call
    ///
    /// `field` names the offending form field so the surface can show the
    /// message next to it.
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    /// Referenced entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// A create/update/delete/upload/fetch call against the persistence
    /// collaborator failed
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Operation not allowed in the current interaction state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error
    #[error("IO error: {0}")]
    Io(String),
}

impl Error {
    /// Build a validation error for `field`
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Convert to the form surfaced at the client/persistence boundary.
    ///
    /// The client has no independent existence check, so a missing
    /// reference reported by the collaborator is a failed persistence call.
    pub fn at_boundary(self) -> Self {
        match self {
            Error::NotFound(what) => Error::Persistence(format!("not found: {}", what)),
            other => other,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation { .. })
    }

    /// Offending field for validation errors
    pub fn field(&self) -> Option<&str> {
        match self {
            Error::Validation { field, .. } => Some(field.as_str()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_becomes_persistence_at_boundary() {
        let err = Error::NotFound("photo photos/a.jpg".to_string()).at_boundary();
        assert!(matches!(err, Error::Persistence(_)));
        assert!(err.to_string().contains("photos/a.jpg"));
    }

    #[test]
    fn test_validation_keeps_field() {
        let err = Error::validation("score", "scores must differ");
        assert!(err.is_validation());
        assert_eq!(err.field(), Some("score"));
        assert_eq!(err.clone().at_boundary(), err);
    }
}
