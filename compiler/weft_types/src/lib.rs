//! Schema type system for weft.
//!
//! Declarations (`Type`) are accumulated into a `TypeSystem` and frozen into
//! a `Schema`. The schema is the single source of truth for type shapes and
//! representation strategies; layout decisions and the node runtime sit on
//! top of it in `weft_layout` and `weft_node`.
//!
//! # Lifecycle
//!
//! ```text
//! TypeSystem::accumulate(..)*  ->  finalize()  ->  Schema (read-only)
//! ```
//!
//! Declarations refer to each other by name, recursively if they like. Only
//! `finalize()` checks that every name resolves.

mod decl;
mod error;
mod kind;
mod name;
mod registry;
mod repr;

pub use decl::{
    EnumDef, FieldDef, FieldFlags, ListDef, MapDef, ReprStrategy, StructDef, Type, TypeDef,
    UnionDef,
};
pub use error::SchemaError;
pub use kind::{Kind, TypeKind};
pub use name::{TypeId, TypeName};
pub use registry::{Schema, TypeSystem, PRELUDE};
pub use repr::{EnumRepr, MapRepr, NullPolicy, StructMapRepr, StructRepr, UnionRepr};
