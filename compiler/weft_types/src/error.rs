//! Registry-time errors.

use thiserror::Error;

use crate::TypeName;

/// An error accumulating, finalizing or querying a type system.
///
/// Always fatal to the call that produced it.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("type `{name}` is already declared")]
    DuplicateName { name: TypeName },

    #[error("type `{from}` refers to undeclared type `{missing}`")]
    UnresolvedReference { from: TypeName, missing: TypeName },

    #[error("type `{name}` not found")]
    NotFound { name: TypeName },

    #[error("invalid representation for `{name}`: {reason}")]
    InvalidRepresentation { name: TypeName, reason: String },
}

impl SchemaError {
    pub(crate) fn invalid(name: &TypeName, reason: impl Into<String>) -> Self {
        Self::InvalidRepresentation {
            name: name.clone(),
            reason: reason.into(),
        }
    }
}
