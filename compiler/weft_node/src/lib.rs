//! Node runtime for weft.
//!
//! Values of schema types are built through assemblers and read through
//! nodes, each in one of two views: the typed view (declared field names
//! and types) and the representation view (the serialized shape). Both
//! views work over one stored `Value`.
//!
//! # Flow
//!
//! ```text
//! Prototype --builder()--> Builder --root()--> NodeAssembler
//!                                                  |
//!                              MapAssembler / ListAssembler (either view)
//!                                                  |
//! Builder::build() --> TypedValue --node()/representation()--> Node
//! ```
//!
//! `Datum` is the schema-free tree codecs exchange; `to_representation`
//! and `from_representation` convert between it and typed values.

mod builder;
mod copy;
mod datum;
mod error;
mod maybe;
mod node;
mod prototype;
mod strategy;
mod value;

pub use builder::{Builder, BuilderState, ListAssembler, MapAssembler, NodeAssembler};
pub use copy::{copy_node, from_representation, to_representation};
pub use datum::Datum;
pub use error::{AccessError, AssemblyError, NodeError, OptionalityError, RepresentationError};
pub use maybe::{Maybe, Slot};
pub use node::{Entries, FieldPair, Node, TypedNode, Values, View};
pub use prototype::{Prototype, REPR_SUFFIX};
pub use value::{Link, MapEntry, MapValue, TypedValue, Value};
