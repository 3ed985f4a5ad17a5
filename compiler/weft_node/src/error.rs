//! Node-level errors.
//!
//! One enum per failure category, all collected under `NodeError` so every
//! public operation in this crate returns a single error type.

use thiserror::Error;
use weft_layout::LayoutError;
use weft_types::{Kind, SchemaError, TypeName};

/// A representation did not decode into the expected type.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RepresentationError {
    #[error("`{ty}` is represented as {expected}, found {found}")]
    Mismatch {
        ty: TypeName,
        expected: Kind,
        found: Kind,
    },

    #[error("`{ty}` has no field, member or value named `{key}`")]
    UnrecognizedField { ty: TypeName, key: String },

    #[error("`{ty}` joins {expected} fields, `{input}` splits into {found}")]
    StringjoinArity {
        ty: TypeName,
        input: String,
        expected: usize,
        found: usize,
    },

    #[error("kinded union `{ty}` has no member represented as {found}")]
    NoKindedMember { ty: TypeName, found: Kind },

    #[error("`{ty}` has {expected} fields, tuple has more")]
    TupleArity { ty: TypeName, expected: usize },

    #[error("field pair of `{ty}` must be a key followed by a value")]
    PairArity { ty: TypeName },
}

/// A maybe slot was left in a state its declaration forbids.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum OptionalityError {
    #[error("required field `{field}` of `{ty}` was never set")]
    RequiredFieldMissing { ty: TypeName, field: String },

    #[error("a `{ty}` slot here is not nullable")]
    NullNotAllowed { ty: TypeName },
}

/// An assembler call broke the construction protocol.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AssemblyError {
    #[error("duplicate key `{key}` in `{ty}`")]
    DuplicateKey { ty: TypeName, key: String },

    #[error("field `{field}` of `{ty}` is already set")]
    FieldAlreadySet { ty: TypeName, field: String },

    #[error("union `{ty}` already holds a member")]
    UnionMemberAlreadySet { ty: TypeName },

    #[error("union `{ty}` finished without a member")]
    EmptyUnion { ty: TypeName },

    #[error("assembler for `{ty}` is already finished")]
    AssemblerFinalized { ty: TypeName },

    #[error("builder is in the errored state")]
    BuilderErrored,

    #[error("previous entry of `{ty}` is not complete")]
    IncompleteValue { ty: TypeName },

    #[error("`{ty}` is a {expected}, cannot assign a {found}")]
    KindMismatch {
        ty: TypeName,
        expected: Kind,
        found: Kind,
    },

    #[error("value is not finished")]
    NotFinished,
}

/// A read-side lookup failed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("no entry for key `{key}`")]
    NotExists { key: String },

    #[error("index {index} out of range for length {len}")]
    OutOfRange { index: usize, len: usize },

    #[error("expected a {expected}, found a {found}")]
    WrongKind { expected: Kind, found: Kind },
}

/// Any error raised by the node runtime.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum NodeError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Representation(#[from] RepresentationError),

    #[error(transparent)]
    Optionality(#[from] OptionalityError),

    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    #[error(transparent)]
    Access(#[from] AccessError),
}
