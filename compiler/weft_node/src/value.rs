//! Frozen value storage.
//!
//! A `Value` is the immutable result of a finished build. It carries no
//! type information of its own; a `TypedNode` pairs it with its `TypeId`
//! and a view to read it.

use std::fmt;

use rustc_hash::FxHashMap;
use weft_layout::CompiledModel;
use weft_types::{Type, TypeId, TypeName};

use crate::{Datum, Node, NodeError, Slot, TypedNode, View};

/// A content link, held as its textual form.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Link(String);

impl Link {
    pub fn new(target: impl Into<String>) -> Self {
        Self(target.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stored content of a value of some schema type.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    Link(Link),
    List(Vec<Slot>),
    Map(MapValue),
    /// Fields in declaration order.
    Struct(Box<[Slot]>),
    /// Index of the present member, and its value.
    Union {
        member: usize,
        value: Box<Value>,
    },
    /// Index of the member.
    Enum(usize),
}

/// Map entries in insertion order, indexed by representation key.
#[derive(Clone, Debug, Default)]
pub struct MapValue {
    entries: Vec<MapEntry>,
    index: FxHashMap<String, usize>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MapEntry {
    /// The typed key.
    pub key: Value,

    /// Canonical string form of `key` in the representation.
    pub repr_key: String,

    pub value: Slot,
}

impl MapValue {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: FxHashMap::default(),
        }
    }

    /// Append an entry. Returns `false` and leaves the map unchanged if
    /// the representation key is already present.
    pub fn insert(&mut self, entry: MapEntry) -> bool {
        if self.index.contains_key(&entry.repr_key) {
            return false;
        }
        self.index.insert(entry.repr_key.clone(), self.entries.len());
        self.entries.push(entry);
        true
    }

    pub fn get(&self, repr_key: &str) -> Option<&MapEntry> {
        self.index.get(repr_key).map(|&i| &self.entries[i])
    }

    #[inline]
    pub fn entries(&self) -> &[MapEntry] {
        &self.entries
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PartialEq for MapValue {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

/// A finished value together with its type.
///
/// Equality compares type and stored content; slot layouts are ignored.
#[derive(Clone, Debug)]
pub struct TypedValue<'m> {
    model: &'m CompiledModel,
    ty: TypeId,
    value: Value,
}

impl<'m> TypedValue<'m> {
    pub(crate) fn new(model: &'m CompiledModel, ty: TypeId, value: Value) -> Self {
        Self { model, ty, value }
    }

    #[inline]
    pub fn model(&self) -> &'m CompiledModel {
        self.model
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.ty
    }

    pub fn ty(&self) -> &'m Type {
        self.model.schema().get(self.ty)
    }

    pub fn type_name(&self) -> &'m TypeName {
        self.ty().name()
    }

    #[inline]
    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    /// Typed view of the value.
    pub fn node(&self) -> Node<'_> {
        Node::Typed(TypedNode::new(self.model, self.ty, &self.value, View::Typed))
    }

    /// Representation view of the value.
    pub fn representation(&self) -> Node<'_> {
        Node::Typed(TypedNode::new(
            self.model,
            self.ty,
            &self.value,
            View::Representation,
        ))
    }

    /// Copy the representation view into a generic tree.
    pub fn to_representation(&self) -> Result<Datum, NodeError> {
        Ok(Datum::from_node(&self.representation())?)
    }
}

impl PartialEq for TypedValue<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.type_name() == other.type_name() && self.value == other.value
    }
}
