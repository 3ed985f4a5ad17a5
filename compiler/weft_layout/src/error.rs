//! Compile-time and query errors.

use thiserror::Error;
use weft_types::{SchemaError, TypeName};

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("type `{ty}` is not a struct")]
    NotAStruct { ty: TypeName },

    #[error("struct `{ty}` has no field `{field}`")]
    UnknownField { ty: TypeName, field: String },

    /// An explicit embedded layout on a field that contains its owner.
    #[error(
        "field `{field}` of `{owner}` refers back to `{owner}` by value; \
         `Maybe<{ty}>` cannot be embedded there"
    )]
    EmbeddedRecursion {
        owner: TypeName,
        field: String,
        ty: TypeName,
    },
}
