//! Crate-wide error taxonomy.
//!
//! Registration, lookup, and property access failures represent programmer
//! or configuration mistakes, so they surface as [`Error`] values that the
//! caller must handle. Runtime non-events — an unmapped input control, a
//! publish with zero subscribers — are not errors and are absorbed silently
//! by the code that encounters them.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// All the ways setup and property access can fail.
#[derive(Debug, Error)]
pub enum Error {
    /// A lookup by id (prototype, system, or timer) found nothing.
    #[error("{kind} \"{id}\" not found")]
    NotFound { kind: &'static str, id: String },

    /// An id (prototype, system, or timer name) is already in use.
    #[error("{kind} \"{id}\" is already registered")]
    DuplicateId { kind: &'static str, id: String },

    /// A property exists but holds a different type than requested.
    #[error("property \"{key}\" does not hold a {expected}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
    },

    /// A property key is absent from the entity's store.
    #[error("property \"{key}\" not found")]
    KeyNotFound { key: String },

    /// A prototype sheet failed to parse.
    #[error("malformed prototype sheet: {0}")]
    Sheet(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Error::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub(crate) fn duplicate(kind: &'static str, id: impl Into<String>) -> Self {
        Error::DuplicateId {
            kind,
            id: id.into(),
        }
    }
}
