//! Error types for ID parsing and validation.

use thiserror::Error;

/// Errors that can occur when parsing, converting, or comparing IDs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdError {
    /// The ID string is empty or only whitespace.
    #[error("ID cannot be empty")]
    Empty,

    /// The ID has nothing before the separator.
    #[error("ID missing prefix: expected '{expected}'")]
    MissingPrefix { expected: &'static str },

    /// The ID has an invalid prefix.
    #[error("invalid ID prefix: expected '{expected}', got '{actual}'")]
    InvalidPrefix {
        expected: &'static str,
        actual: String,
    },

    /// The ID is missing the underscore separator.
    #[error("ID missing underscore separator")]
    MissingSeparator,

    /// The ULID portion of the ID is invalid.
    #[error("invalid ULID: {0}")]
    InvalidUlid(String),

    /// A value of another type was handed to an operation on `expected`.
    #[error("incompatible type: expected a value of type '{expected}'")]
    IncompatibleType { expected: &'static str },
}

impl IdError {
    /// Returns true if this error indicates the input was empty.
    pub fn is_empty(&self) -> bool {
        matches!(self, IdError::Empty)
    }

    /// Returns true if this error indicates a prefix mismatch.
    pub fn is_prefix_error(&self) -> bool {
        matches!(
            self,
            IdError::MissingPrefix { .. } | IdError::InvalidPrefix { .. }
        )
    }

    /// Returns true if the input text was malformed, as opposed to a
    /// programming error such as [`IdError::IncompatibleType`].
    pub fn is_format_error(&self) -> bool {
        !matches!(self, IdError::IncompatibleType { .. })
    }
}
