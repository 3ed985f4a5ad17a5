//! Read views over stored values.
//!
//! A `Node` is anything that can be read through the kind-polymorphic
//! contract: a typed projection over a `Value`, a synthesized key string,
//! an explicit null, or a generic `Datum`. Nodes borrow; nothing here
//! copies stored content.
//!
//! # Views
//!
//! The same stored value reads differently through each `View`:
//!
//! | Type | Typed view | Representation view |
//! |------|------------|---------------------|
//! | struct | map of field names | map with renamed keys, tuple list, list of key/value pairs, or joined string |
//! | union | single-entry map keyed by member type name | keyed map or the member's own representation |
//! | enum | member name | represented string or int |
//! | map | typed keys | canonical key strings, nulls per `NullPolicy` |
//!
//! Children inherit the view of their parent.

use std::borrow::Cow;
use std::fmt;

use weft_layout::CompiledModel;
use weft_types::{
    Kind, NullPolicy, StructDef, StructMapRepr, StructRepr, Type, TypeDef, TypeId, TypeName,
    UnionRepr,
};

use crate::{strategy, AccessError, Datum, Link, MapValue, Maybe, Slot, Value};

/// Which projection of a typed value to read or build.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum View {
    Typed,
    Representation,
}

impl View {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Typed => "typed",
            Self::Representation => "representation",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A readable node.
#[derive(Clone, Copy, Debug)]
pub enum Node<'a> {
    Typed(TypedNode<'a>),
    Null,
    /// A map key synthesized from the schema or the stored entry.
    Key(&'a str),
    /// One `[key, value]` element of a list-pairs struct.
    Pair(FieldPair<'a>),
    Basic(&'a Datum),
}

/// A present field of a list-pairs struct, read as a two-element list.
#[derive(Clone, Copy, Debug)]
pub struct FieldPair<'a> {
    key: &'a str,
    /// `None` for a null field.
    value: Option<TypedNode<'a>>,
}

impl<'a> FieldPair<'a> {
    #[inline]
    pub fn key(&self) -> &'a str {
        self.key
    }

    pub fn value(&self) -> Node<'a> {
        self.value.map_or(Node::Null, Node::Typed)
    }

    fn get(&self, index: usize) -> Option<Node<'a>> {
        match index {
            0 => Some(Node::Key(self.key)),
            1 => Some(self.value()),
            _ => None,
        }
    }
}

/// A stored value read through one view of its type.
#[derive(Clone, Copy)]
pub struct TypedNode<'a> {
    model: &'a CompiledModel,
    ty: TypeId,
    value: &'a Value,
    view: View,
}

/// How a typed node reads, after applying its type's strategy.
#[derive(Clone, Copy)]
enum Shape<'a> {
    Scalar(&'a Value),
    List {
        items: &'a [Slot],
        elem: TypeId,
    },
    Map {
        map: &'a MapValue,
        key: TypeId,
        value: TypeId,
        omit_nulls: bool,
    },
    /// `keys` is `None` in the typed view.
    Struct {
        def: &'a StructDef,
        keys: Option<&'a StructMapRepr>,
        slots: &'a [Slot],
        refs: &'a [TypeId],
    },
    Tuple {
        slots: &'a [Slot],
        refs: &'a [TypeId],
    },
    Listpairs {
        def: &'a StructDef,
        keys: &'a StructMapRepr,
        slots: &'a [Slot],
        refs: &'a [TypeId],
    },
    Stringjoin {
        join: &'a str,
        slots: &'a [Slot],
    },
    Union {
        key: &'a str,
        member: TypeId,
        value: &'a Value,
    },
    EnumString(&'a str),
    EnumInt(i64),
    /// Stored content does not fit the type.
    Invalid,
}

impl Shape<'_> {
    fn kind(self) -> Kind {
        match self {
            Self::Scalar(value) => match value {
                Value::Bool(_) => Kind::Bool,
                Value::Int(_) => Kind::Int,
                Value::Float(_) => Kind::Float,
                Value::String(_) => Kind::String,
                Value::Bytes(_) => Kind::Bytes,
                Value::Link(_) => Kind::Link,
                _ => Kind::Null,
            },
            Self::List { .. } | Self::Tuple { .. } | Self::Listpairs { .. } => Kind::List,
            Self::Map { .. } | Self::Struct { .. } | Self::Union { .. } => Kind::Map,
            Self::Stringjoin { .. } | Self::EnumString(_) => Kind::String,
            Self::EnumInt(_) => Kind::Int,
            Self::Invalid => Kind::Null,
        }
    }
}

fn wrong_kind(expected: Kind, found: Kind) -> AccessError {
    AccessError::WrongKind { expected, found }
}

impl<'a> TypedNode<'a> {
    pub fn new(model: &'a CompiledModel, ty: TypeId, value: &'a Value, view: View) -> Self {
        Self {
            model,
            ty,
            value,
            view,
        }
    }

    #[inline]
    pub fn model(&self) -> &'a CompiledModel {
        self.model
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.ty
    }

    /// The declared type.
    pub fn ty(&self) -> &'a Type {
        self.model.schema().get(self.ty)
    }

    pub fn type_name(&self) -> &'a TypeName {
        self.ty().name()
    }

    #[inline]
    pub fn view(&self) -> View {
        self.view
    }

    #[inline]
    pub fn value(&self) -> &'a Value {
        self.value
    }

    /// The typed view of the same stored value.
    #[must_use]
    pub fn typed(&self) -> Self {
        Self {
            view: View::Typed,
            ..*self
        }
    }

    /// The representation view of the same stored value.
    #[must_use]
    pub fn representation(&self) -> Self {
        Self {
            view: View::Representation,
            ..*self
        }
    }

    /// Step through kinded unions, whose representation is their member's.
    fn resolve(self) -> Self {
        let mut node = self;
        while node.view == View::Representation {
            let schema = node.model.schema();
            match (schema.get(node.ty).def(), node.value) {
                (TypeDef::Union(def), Value::Union { member, value })
                    if def.repr == UnionRepr::Kinded =>
                {
                    let Some(&member_ty) = schema.refs(node.ty).get(*member) else {
                        break;
                    };
                    node = Self {
                        ty: member_ty,
                        value,
                        ..node
                    };
                }
                _ => break,
            }
        }
        node
    }

    fn shape(&self) -> Shape<'a> {
        let node = self.resolve();
        let schema = node.model.schema();
        let refs = schema.refs(node.ty);
        match (schema.get(node.ty).def(), node.value) {
            (TypeDef::Bool, Value::Bool(_))
            | (TypeDef::Int, Value::Int(_))
            | (TypeDef::Float, Value::Float(_))
            | (TypeDef::String, Value::String(_))
            | (TypeDef::Bytes, Value::Bytes(_))
            | (TypeDef::Link, Value::Link(_)) => Shape::Scalar(node.value),
            (TypeDef::List(_), Value::List(items)) => match *refs {
                [elem] => Shape::List { items, elem },
                _ => Shape::Invalid,
            },
            (TypeDef::Map(def), Value::Map(map)) => match *refs {
                [key, value] => Shape::Map {
                    map,
                    key,
                    value,
                    omit_nulls: node.view == View::Representation
                        && def.repr.nulls == NullPolicy::OmitNulls,
                },
                _ => Shape::Invalid,
            },
            (TypeDef::Struct(def), Value::Struct(slots)) => match (node.view, &def.repr) {
                (View::Typed, _) => Shape::Struct {
                    def,
                    keys: None,
                    slots,
                    refs,
                },
                (View::Representation, StructRepr::Map(keys)) => Shape::Struct {
                    def,
                    keys: Some(keys),
                    slots,
                    refs,
                },
                (View::Representation, StructRepr::Tuple) => Shape::Tuple { slots, refs },
                (View::Representation, StructRepr::Listpairs(keys)) => Shape::Listpairs {
                    def,
                    keys,
                    slots,
                    refs,
                },
                (View::Representation, StructRepr::Stringjoin { join }) => {
                    Shape::Stringjoin { join, slots }
                }
            },
            (TypeDef::Union(def), Value::Union { member, value }) => {
                let (Some(name), Some(&member_ty)) = (def.members.get(*member), refs.get(*member))
                else {
                    return Shape::Invalid;
                };
                let key = match node.view {
                    View::Typed => Some(name.as_str()),
                    View::Representation => def.repr.discriminant_of(name),
                };
                key.map_or(Shape::Invalid, |key| Shape::Union {
                    key,
                    member: member_ty,
                    value,
                })
            }
            (TypeDef::Enum(def), Value::Enum(index)) => match node.view {
                View::Typed => def
                    .members
                    .get(*index)
                    .map_or(Shape::Invalid, |m| Shape::EnumString(m)),
                View::Representation => {
                    match (
                        strategy::enum_string(def, *index),
                        strategy::enum_int(def, *index),
                    ) {
                        (Some(s), _) => Shape::EnumString(s),
                        (None, Some(v)) => Shape::EnumInt(v),
                        (None, None) => Shape::Invalid,
                    }
                }
            },
            _ => Shape::Invalid,
        }
    }

    fn at(&self, ty: TypeId, value: &'a Value) -> Node<'a> {
        Node::Typed(Self {
            model: self.model,
            ty,
            value,
            view: self.view,
        })
    }

    /// Node for a child slot; `None` if the slot is absent.
    fn child(&self, ty: TypeId, slot: &'a Slot) -> Option<Node<'a>> {
        match slot.get() {
            Maybe::Absent => None,
            Maybe::Null => Some(Node::Null),
            Maybe::Value(value) => Some(self.at(ty, value)),
        }
    }

    /// The `pos`-th field of a list-pairs struct as a pair; `None` if absent.
    fn pair(
        &self,
        def: &'a StructDef,
        keys: &'a StructMapRepr,
        slot: &'a Slot,
        ty: TypeId,
        pos: usize,
    ) -> Option<FieldPair<'a>> {
        let field = def.fields.get(pos)?;
        let value = match self.child(ty, slot)? {
            Node::Typed(node) => Some(node),
            _ => None,
        };
        Some(FieldPair {
            key: keys.key_for(&field.name),
            value,
        })
    }

    /// Present fields of a list-pairs struct, in declaration order.
    fn pairs(
        self,
        def: &'a StructDef,
        keys: &'a StructMapRepr,
        slots: &'a [Slot],
        refs: &'a [TypeId],
    ) -> impl Iterator<Item = FieldPair<'a>> + 'a {
        slots
            .iter()
            .zip(refs)
            .enumerate()
            .filter_map(move |(pos, (slot, &ty))| self.pair(def, keys, slot, ty, pos))
    }

    pub fn kind(&self) -> Kind {
        self.shape().kind()
    }

    /// Number of entries or elements.
    ///
    /// Struct maps count present fields only; maps that omit nulls in
    /// their representation do not count null entries there.
    pub fn length(&self) -> Result<usize, AccessError> {
        Ok(match self.shape() {
            Shape::List { items, .. } => items.len(),
            Shape::Tuple { slots, .. } => slots.len(),
            Shape::Map {
                map,
                omit_nulls: true,
                ..
            } => map
                .entries()
                .iter()
                .filter(|e| !e.value.get().is_null())
                .count(),
            Shape::Map { map, .. } => map.len(),
            Shape::Struct { slots, .. } | Shape::Listpairs { slots, .. } => {
                slots.iter().filter(|s| !s.is_absent()).count()
            }
            Shape::Union { .. } => 1,
            shape => return Err(wrong_kind(Kind::Map, shape.kind())),
        })
    }

    pub fn lookup_by_key(&self, key: &str) -> Result<Node<'a>, AccessError> {
        let not_exists = || AccessError::NotExists {
            key: key.to_owned(),
        };
        match self.shape() {
            Shape::Map {
                map,
                key: key_ty,
                value,
                omit_nulls,
            } => {
                let stored = self.stored_key(key_ty, key).ok_or_else(not_exists)?;
                self.map_entry(map, value, omit_nulls, &stored)
                    .ok_or_else(not_exists)
            }
            Shape::Struct {
                def,
                keys,
                slots,
                refs,
            } => {
                let field = match keys {
                    Some(keys) => keys.field_for(key),
                    None => Some(key),
                };
                let (index, _) = field.and_then(|f| def.field(f)).ok_or_else(not_exists)?;
                match (slots.get(index), refs.get(index)) {
                    (Some(slot), Some(&ty)) => self.child(ty, slot).ok_or_else(not_exists),
                    _ => Err(not_exists()),
                }
            }
            Shape::Union {
                key: present,
                member,
                value,
            } => {
                if present == key {
                    Ok(self.at(member, value))
                } else {
                    Err(not_exists())
                }
            }
            shape => Err(wrong_kind(Kind::Map, shape.kind())),
        }
    }

    /// Look up a map entry by a key node, using the key's representation.
    pub fn lookup_by_node(&self, key: &Node<'_>) -> Result<Node<'a>, AccessError> {
        let key = key.representation().as_string()?;
        match self.shape() {
            Shape::Map {
                map,
                value,
                omit_nulls,
                ..
            } => self
                .map_entry(map, value, omit_nulls, &key)
                .ok_or_else(|| AccessError::NotExists {
                    key: key.into_owned(),
                }),
            _ => self.lookup_by_key(&key),
        }
    }

    /// The stored (representation) key for a key string given in this view.
    ///
    /// Enum keys read as member names in the typed view. Other key types
    /// have no separate typed string form.
    fn stored_key<'k>(&self, key_ty: TypeId, key: &'k str) -> Option<Cow<'k, str>> {
        if self.view == View::Typed {
            if let TypeDef::Enum(def) = self.model.schema().get(key_ty).def() {
                let member = def.member(key)?;
                return strategy::enum_string(def, member).map(|s| Cow::Owned(s.to_owned()));
            }
        }
        Some(Cow::Borrowed(key))
    }

    fn map_entry(
        &self,
        map: &'a MapValue,
        value: TypeId,
        omit_nulls: bool,
        key: &str,
    ) -> Option<Node<'a>> {
        let entry = map.get(key)?;
        if omit_nulls && entry.value.get().is_null() {
            return None;
        }
        self.child(value, &entry.value)
    }

    pub fn lookup_by_index(&self, index: usize) -> Result<Node<'a>, AccessError> {
        match self.shape() {
            Shape::List { items, elem } => {
                let slot = items.get(index).ok_or(AccessError::OutOfRange {
                    index,
                    len: items.len(),
                })?;
                Ok(self.child(elem, slot).unwrap_or(Node::Null))
            }
            Shape::Tuple { slots, refs } => match (slots.get(index), refs.get(index)) {
                (Some(slot), Some(&ty)) => Ok(self.child(ty, slot).unwrap_or(Node::Null)),
                _ => Err(AccessError::OutOfRange {
                    index,
                    len: slots.len(),
                }),
            },
            Shape::Listpairs {
                def,
                keys,
                slots,
                refs,
            } => {
                let mut pairs = self.resolve().pairs(def, keys, slots, refs);
                match pairs.nth(index) {
                    Some(pair) => Ok(Node::Pair(pair)),
                    None => Err(AccessError::OutOfRange {
                        index,
                        len: slots.iter().filter(|s| !s.is_absent()).count(),
                    }),
                }
            }
            shape => Err(wrong_kind(Kind::List, shape.kind())),
        }
    }

    pub fn entries(&self) -> Result<Entries<'a>, AccessError> {
        let shape = self.shape();
        match shape {
            Shape::Map { .. } | Shape::Struct { .. } | Shape::Union { .. } => Ok(Entries {
                source: EntrySource::Typed(*self, shape),
                pos: 0,
            }),
            _ => Err(wrong_kind(Kind::Map, shape.kind())),
        }
    }

    pub fn values(&self) -> Result<Values<'a>, AccessError> {
        let shape = self.shape();
        match shape {
            Shape::List { .. } | Shape::Tuple { .. } | Shape::Listpairs { .. } => Ok(Values {
                source: ValueSource::Typed(self.resolve(), shape),
                pos: 0,
            }),
            _ => Err(wrong_kind(Kind::List, shape.kind())),
        }
    }

    pub fn as_bool(&self) -> Result<bool, AccessError> {
        match self.shape() {
            Shape::Scalar(Value::Bool(b)) => Ok(*b),
            shape => Err(wrong_kind(Kind::Bool, shape.kind())),
        }
    }

    pub fn as_int(&self) -> Result<i64, AccessError> {
        match self.shape() {
            Shape::Scalar(Value::Int(i)) => Ok(*i),
            Shape::EnumInt(i) => Ok(i),
            shape => Err(wrong_kind(Kind::Int, shape.kind())),
        }
    }

    pub fn as_float(&self) -> Result<f64, AccessError> {
        match self.shape() {
            Shape::Scalar(Value::Float(f)) => Ok(*f),
            shape => Err(wrong_kind(Kind::Float, shape.kind())),
        }
    }

    /// String content; owned only for joined representations.
    pub fn as_string(&self) -> Result<Cow<'a, str>, AccessError> {
        match self.shape() {
            Shape::Scalar(Value::String(s)) => Ok(Cow::Borrowed(s.as_str())),
            Shape::EnumString(s) => Ok(Cow::Borrowed(s)),
            Shape::Stringjoin { join, slots } => Ok(Cow::Owned(strategy::join_fields(join, slots))),
            shape => Err(wrong_kind(Kind::String, shape.kind())),
        }
    }

    pub fn as_bytes(&self) -> Result<&'a [u8], AccessError> {
        match self.shape() {
            Shape::Scalar(Value::Bytes(b)) => Ok(b.as_slice()),
            shape => Err(wrong_kind(Kind::Bytes, shape.kind())),
        }
    }

    pub fn as_link(&self) -> Result<&'a Link, AccessError> {
        match self.shape() {
            Shape::Scalar(Value::Link(l)) => Ok(l),
            shape => Err(wrong_kind(Kind::Link, shape.kind())),
        }
    }
}

impl fmt::Debug for TypedNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedNode")
            .field("ty", self.type_name())
            .field("view", &self.view)
            .field("value", self.value)
            .finish()
    }
}

impl<'a> From<TypedNode<'a>> for Node<'a> {
    fn from(node: TypedNode<'a>) -> Self {
        Self::Typed(node)
    }
}

impl<'a> Node<'a> {
    pub fn kind(&self) -> Kind {
        match *self {
            Self::Typed(node) => node.kind(),
            Self::Null => Kind::Null,
            Self::Key(_) => Kind::String,
            Self::Pair(_) => Kind::List,
            Self::Basic(datum) => datum.kind(),
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        self.kind() == Kind::Null
    }

    pub fn as_typed(&self) -> Option<&TypedNode<'a>> {
        match self {
            Self::Typed(node) => Some(node),
            _ => None,
        }
    }

    /// Representation view of this node. Untyped nodes are their own
    /// representation.
    #[must_use]
    pub fn representation(&self) -> Self {
        match *self {
            Self::Typed(node) => Self::Typed(node.representation()),
            other => other,
        }
    }

    pub fn length(&self) -> Result<usize, AccessError> {
        match *self {
            Self::Typed(node) => node.length(),
            Self::Pair(_) => Ok(2),
            Self::Basic(Datum::List(items)) => Ok(items.len()),
            Self::Basic(Datum::Map(entries)) => Ok(entries.len()),
            other => Err(wrong_kind(Kind::Map, other.kind())),
        }
    }

    pub fn lookup_by_key(&self, key: &str) -> Result<Self, AccessError> {
        match *self {
            Self::Typed(node) => node.lookup_by_key(key),
            Self::Basic(Datum::Map(entries)) => entries
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| Self::Basic(v))
                .ok_or_else(|| AccessError::NotExists {
                    key: key.to_owned(),
                }),
            other => Err(wrong_kind(Kind::Map, other.kind())),
        }
    }

    pub fn lookup_by_node(&self, key: &Node<'_>) -> Result<Self, AccessError> {
        match *self {
            Self::Typed(node) => node.lookup_by_node(key),
            _ => self.lookup_by_key(&key.representation().as_string()?),
        }
    }

    pub fn lookup_by_index(&self, index: usize) -> Result<Self, AccessError> {
        match *self {
            Self::Typed(node) => node.lookup_by_index(index),
            Self::Pair(pair) => pair
                .get(index)
                .ok_or(AccessError::OutOfRange { index, len: 2 }),
            Self::Basic(Datum::List(items)) => {
                items
                    .get(index)
                    .map(Self::Basic)
                    .ok_or(AccessError::OutOfRange {
                        index,
                        len: items.len(),
                    })
            }
            other => Err(wrong_kind(Kind::List, other.kind())),
        }
    }

    /// Map entries. The iterator is finite and can be cloned to restart.
    pub fn entries(&self) -> Result<Entries<'a>, AccessError> {
        match *self {
            Self::Typed(node) => node.entries(),
            Self::Basic(Datum::Map(entries)) => Ok(Entries {
                source: EntrySource::Basic(entries),
                pos: 0,
            }),
            other => Err(wrong_kind(Kind::Map, other.kind())),
        }
    }

    /// List elements. The iterator is finite and can be cloned to restart.
    pub fn values(&self) -> Result<Values<'a>, AccessError> {
        match *self {
            Self::Typed(node) => node.values(),
            Self::Pair(pair) => Ok(Values {
                source: ValueSource::Pair(pair),
                pos: 0,
            }),
            Self::Basic(Datum::List(items)) => Ok(Values {
                source: ValueSource::Basic(items),
                pos: 0,
            }),
            other => Err(wrong_kind(Kind::List, other.kind())),
        }
    }

    pub fn as_bool(&self) -> Result<bool, AccessError> {
        match *self {
            Self::Typed(node) => node.as_bool(),
            Self::Basic(Datum::Bool(b)) => Ok(*b),
            other => Err(wrong_kind(Kind::Bool, other.kind())),
        }
    }

    pub fn as_int(&self) -> Result<i64, AccessError> {
        match *self {
            Self::Typed(node) => node.as_int(),
            Self::Basic(Datum::Int(i)) => Ok(*i),
            other => Err(wrong_kind(Kind::Int, other.kind())),
        }
    }

    pub fn as_float(&self) -> Result<f64, AccessError> {
        match *self {
            Self::Typed(node) => node.as_float(),
            Self::Basic(Datum::Float(f)) => Ok(*f),
            other => Err(wrong_kind(Kind::Float, other.kind())),
        }
    }

    pub fn as_string(&self) -> Result<Cow<'a, str>, AccessError> {
        match *self {
            Self::Typed(node) => node.as_string(),
            Self::Key(key) => Ok(Cow::Borrowed(key)),
            Self::Basic(Datum::String(s)) => Ok(Cow::Borrowed(s.as_str())),
            other => Err(wrong_kind(Kind::String, other.kind())),
        }
    }

    pub fn as_bytes(&self) -> Result<&'a [u8], AccessError> {
        match *self {
            Self::Typed(node) => node.as_bytes(),
            Self::Basic(Datum::Bytes(b)) => Ok(b.as_slice()),
            other => Err(wrong_kind(Kind::Bytes, other.kind())),
        }
    }

    pub fn as_link(&self) -> Result<&'a Link, AccessError> {
        match *self {
            Self::Typed(node) => node.as_link(),
            Self::Basic(Datum::Link(l)) => Ok(l),
            other => Err(wrong_kind(Kind::Link, other.kind())),
        }
    }
}

/// Iterator over `(key, value)` pairs of a map-kind node.
#[derive(Clone, Debug)]
pub struct Entries<'a> {
    source: EntrySource<'a>,
    pos: usize,
}

#[derive(Clone, Copy)]
enum EntrySource<'a> {
    Typed(TypedNode<'a>, Shape<'a>),
    Basic(&'a [(String, Datum)]),
}

impl fmt::Debug for EntrySource<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Typed(node, _) => f.debug_tuple("Typed").field(node).finish(),
            Self::Basic(entries) => f.debug_tuple("Basic").field(entries).finish(),
        }
    }
}

impl<'a> Iterator for Entries<'a> {
    type Item = (Node<'a>, Node<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let pos = self.pos;
            self.pos += 1;
            let (node, shape) = match self.source {
                EntrySource::Basic(entries) => {
                    let (key, value) = entries.get(pos)?;
                    return Some((Node::Key(key), Node::Basic(value)));
                }
                EntrySource::Typed(node, shape) => (node, shape),
            };
            match shape {
                Shape::Map {
                    map,
                    key,
                    value,
                    omit_nulls,
                } => {
                    let entry = map.entries().get(pos)?;
                    if omit_nulls && entry.value.get().is_null() {
                        continue;
                    }
                    let key_node = match node.view {
                        View::Typed => node.at(key, &entry.key),
                        View::Representation => Node::Key(&entry.repr_key),
                    };
                    if let Some(value_node) = node.child(value, &entry.value) {
                        return Some((key_node, value_node));
                    }
                }
                Shape::Struct {
                    def,
                    keys,
                    slots,
                    refs,
                } => {
                    let slot = slots.get(pos)?;
                    let (Some(field), Some(&ty)) = (def.fields.get(pos), refs.get(pos)) else {
                        return None;
                    };
                    let Some(value_node) = node.child(ty, slot) else {
                        continue;
                    };
                    let key = keys.map_or(field.name.as_str(), |keys| keys.key_for(&field.name));
                    return Some((Node::Key(key), value_node));
                }
                Shape::Union { key, member, value } => {
                    return (pos == 0).then(|| (Node::Key(key), node.at(member, value)));
                }
                _ => return None,
            }
        }
    }
}

/// Iterator over the elements of a list-kind node.
#[derive(Clone, Debug)]
pub struct Values<'a> {
    source: ValueSource<'a>,
    pos: usize,
}

#[derive(Clone, Copy)]
enum ValueSource<'a> {
    Typed(TypedNode<'a>, Shape<'a>),
    Pair(FieldPair<'a>),
    Basic(&'a [Datum]),
}

impl fmt::Debug for ValueSource<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Typed(node, _) => f.debug_tuple("Typed").field(node).finish(),
            Self::Pair(pair) => f.debug_tuple("Pair").field(pair).finish(),
            Self::Basic(items) => f.debug_tuple("Basic").field(items).finish(),
        }
    }
}

impl<'a> Iterator for Values<'a> {
    type Item = Node<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let pos = self.pos;
        self.pos += 1;
        match self.source {
            ValueSource::Basic(items) => items.get(pos).map(Node::Basic),
            ValueSource::Pair(pair) => pair.get(pos),
            ValueSource::Typed(
                node,
                Shape::Listpairs {
                    def,
                    keys,
                    slots,
                    refs,
                },
            ) => {
                // `pos` counts fields, skipping absent ones.
                loop {
                    let pos = self.pos - 1;
                    let (slot, &ty) = slots.get(pos).zip(refs.get(pos))?;
                    if let Some(pair) = node.pair(def, keys, slot, ty, pos) {
                        return Some(Node::Pair(pair));
                    }
                    self.pos += 1;
                }
            }
            ValueSource::Typed(node, Shape::List { items, elem }) => items
                .get(pos)
                .map(|slot| node.child(elem, slot).unwrap_or(Node::Null)),
            ValueSource::Typed(node, Shape::Tuple { slots, refs }) => {
                match (slots.get(pos), refs.get(pos)) {
                    (Some(slot), Some(&ty)) => Some(node.child(ty, slot).unwrap_or(Node::Null)),
                    _ => None,
                }
            }
            ValueSource::Typed(..) => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Tests can panic")]
mod tests;
