//! Type declarations.
//!
//! A `Type` is a named, immutable declaration. Declarations refer to other
//! types by `TypeName` only; resolvability is the registry's concern, so a
//! declaration may name itself or a type accumulated later.

use bitflags::bitflags;
use smallvec::SmallVec;

use crate::{EnumRepr, Kind, MapRepr, StructRepr, TypeKind, TypeName, UnionRepr};

bitflags! {
    /// Optionality of a struct field.
    ///
    /// `OPTIONAL` lets the field be absent; `NULLABLE` lets it hold an
    /// explicit null. Either flag makes the field's runtime value a maybe.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct FieldFlags: u8 {
        const OPTIONAL = 1 << 0;
        const NULLABLE = 1 << 1;
    }
}

/// A named type declaration.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Type {
    name: TypeName,
    def: TypeDef,
}

/// The body of a type declaration.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeDef {
    Bool,
    Int,
    Float,
    String,
    Bytes,
    Link,
    List(ListDef),
    Map(MapDef),
    Struct(StructDef),
    Union(UnionDef),
    Enum(EnumDef),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ListDef {
    pub elem: TypeName,
    pub elem_nullable: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MapDef {
    pub key: TypeName,
    pub value: TypeName,
    pub value_nullable: bool,
    pub repr: MapRepr,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StructDef {
    pub fields: Vec<FieldDef>,
    pub repr: StructRepr,
}

/// Definition of a struct field.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldDef {
    /// Field name in the typed view.
    pub name: String,

    /// Field type.
    pub ty: TypeName,

    pub flags: FieldFlags,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UnionDef {
    pub members: Vec<TypeName>,
    pub repr: UnionRepr,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EnumDef {
    pub members: Vec<String>,
    pub repr: EnumRepr,
}

/// Borrowed view of a type's representation strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReprStrategy<'a> {
    /// Scalars represent as themselves.
    Scalar(Kind),
    /// Lists represent as lists of their elements' representations.
    List,
    Map(&'a MapRepr),
    Struct(&'a StructRepr),
    Union(&'a UnionRepr),
    Enum(&'a EnumRepr),
}

impl FieldDef {
    pub fn new(name: impl Into<String>, ty: impl Into<TypeName>, optional: bool, nullable: bool) -> Self {
        let mut flags = FieldFlags::empty();
        flags.set(FieldFlags::OPTIONAL, optional);
        flags.set(FieldFlags::NULLABLE, nullable);
        Self {
            name: name.into(),
            ty: ty.into(),
            flags,
        }
    }

    /// A required, non-nullable field.
    pub fn required(name: impl Into<String>, ty: impl Into<TypeName>) -> Self {
        Self::new(name, ty, false, false)
    }

    #[inline]
    pub fn is_optional(&self) -> bool {
        self.flags.contains(FieldFlags::OPTIONAL)
    }

    #[inline]
    pub fn is_nullable(&self) -> bool {
        self.flags.contains(FieldFlags::NULLABLE)
    }

    /// Check if the field's value is a maybe (optional or nullable).
    #[inline]
    pub fn is_maybe(&self) -> bool {
        !self.flags.is_empty()
    }
}

impl Type {
    pub fn new(name: impl Into<TypeName>, def: TypeDef) -> Self {
        Self {
            name: name.into(),
            def,
        }
    }

    pub fn bool(name: impl Into<TypeName>) -> Self {
        Self::new(name, TypeDef::Bool)
    }

    pub fn int(name: impl Into<TypeName>) -> Self {
        Self::new(name, TypeDef::Int)
    }

    pub fn float(name: impl Into<TypeName>) -> Self {
        Self::new(name, TypeDef::Float)
    }

    pub fn string(name: impl Into<TypeName>) -> Self {
        Self::new(name, TypeDef::String)
    }

    pub fn bytes(name: impl Into<TypeName>) -> Self {
        Self::new(name, TypeDef::Bytes)
    }

    pub fn link(name: impl Into<TypeName>) -> Self {
        Self::new(name, TypeDef::Link)
    }

    pub fn list(name: impl Into<TypeName>, elem: impl Into<TypeName>, elem_nullable: bool) -> Self {
        Self::new(
            name,
            TypeDef::List(ListDef {
                elem: elem.into(),
                elem_nullable,
            }),
        )
    }

    /// A map with the default (explicit null) representation.
    pub fn map(
        name: impl Into<TypeName>,
        key: impl Into<TypeName>,
        value: impl Into<TypeName>,
        value_nullable: bool,
    ) -> Self {
        Self::map_with_repr(name, key, value, value_nullable, MapRepr::default())
    }

    pub fn map_with_repr(
        name: impl Into<TypeName>,
        key: impl Into<TypeName>,
        value: impl Into<TypeName>,
        value_nullable: bool,
        repr: MapRepr,
    ) -> Self {
        Self::new(
            name,
            TypeDef::Map(MapDef {
                key: key.into(),
                value: value.into(),
                value_nullable,
                repr,
            }),
        )
    }

    pub fn structure(name: impl Into<TypeName>, fields: Vec<FieldDef>, repr: StructRepr) -> Self {
        Self::new(name, TypeDef::Struct(StructDef { fields, repr }))
    }

    pub fn union<M: Into<TypeName>>(
        name: impl Into<TypeName>,
        members: impl IntoIterator<Item = M>,
        repr: UnionRepr,
    ) -> Self {
        Self::new(
            name,
            TypeDef::Union(UnionDef {
                members: members.into_iter().map(Into::into).collect(),
                repr,
            }),
        )
    }

    pub fn enumeration<M: Into<String>>(
        name: impl Into<TypeName>,
        members: impl IntoIterator<Item = M>,
        repr: EnumRepr,
    ) -> Self {
        Self::new(
            name,
            TypeDef::Enum(EnumDef {
                members: members.into_iter().map(Into::into).collect(),
                repr,
            }),
        )
    }

    #[inline]
    pub fn name(&self) -> &TypeName {
        &self.name
    }

    #[inline]
    pub fn def(&self) -> &TypeDef {
        &self.def
    }

    pub fn type_kind(&self) -> TypeKind {
        match &self.def {
            TypeDef::Bool => TypeKind::Bool,
            TypeDef::Int => TypeKind::Int,
            TypeDef::Float => TypeKind::Float,
            TypeDef::String => TypeKind::String,
            TypeDef::Bytes => TypeKind::Bytes,
            TypeDef::Link => TypeKind::Link,
            TypeDef::List(_) => TypeKind::List,
            TypeDef::Map(_) => TypeKind::Map,
            TypeDef::Struct(_) => TypeKind::Struct,
            TypeDef::Union(_) => TypeKind::Union,
            TypeDef::Enum(_) => TypeKind::Enum,
        }
    }

    /// The kind of this type's typed view.
    pub fn kind(&self) -> Kind {
        match &self.def {
            TypeDef::Bool => Kind::Bool,
            TypeDef::Int => Kind::Int,
            TypeDef::Float => Kind::Float,
            TypeDef::String | TypeDef::Enum(_) => Kind::String,
            TypeDef::Bytes => Kind::Bytes,
            TypeDef::Link => Kind::Link,
            TypeDef::List(_) => Kind::List,
            TypeDef::Map(_) | TypeDef::Struct(_) | TypeDef::Union(_) => Kind::Map,
        }
    }

    /// The kind of this type's representation view.
    ///
    /// `None` for kinded unions, whose representation kind is that of
    /// whichever member is present.
    pub fn representation_kind(&self) -> Option<Kind> {
        match &self.def {
            TypeDef::Struct(def) => Some(match def.repr {
                StructRepr::Map(_) => Kind::Map,
                StructRepr::Tuple | StructRepr::Listpairs(_) => Kind::List,
                StructRepr::Stringjoin { .. } => Kind::String,
            }),
            TypeDef::Union(def) => match def.repr {
                UnionRepr::Keyed(_) => Some(Kind::Map),
                UnionRepr::Kinded => None,
            },
            TypeDef::Enum(def) => Some(match def.repr {
                EnumRepr::String(_) => Kind::String,
                EnumRepr::Int(_) => Kind::Int,
            }),
            TypeDef::Bool
            | TypeDef::Int
            | TypeDef::Float
            | TypeDef::String
            | TypeDef::Bytes
            | TypeDef::Link
            | TypeDef::List(_)
            | TypeDef::Map(_) => Some(self.kind()),
        }
    }

    pub fn representation_strategy(&self) -> ReprStrategy<'_> {
        match &self.def {
            TypeDef::List(_) => ReprStrategy::List,
            TypeDef::Map(def) => ReprStrategy::Map(&def.repr),
            TypeDef::Struct(def) => ReprStrategy::Struct(&def.repr),
            TypeDef::Union(def) => ReprStrategy::Union(&def.repr),
            TypeDef::Enum(def) => ReprStrategy::Enum(&def.repr),
            TypeDef::Bool
            | TypeDef::Int
            | TypeDef::Float
            | TypeDef::String
            | TypeDef::Bytes
            | TypeDef::Link => ReprStrategy::Scalar(self.kind()),
        }
    }

    /// Names this declaration refers to, in canonical order.
    ///
    /// List: element. Map: key, value. Struct: field types in declaration
    /// order. Union: members in declaration order.
    pub fn references(&self) -> SmallVec<[&TypeName; 4]> {
        match &self.def {
            TypeDef::List(def) => smallvec::smallvec![&def.elem],
            TypeDef::Map(def) => smallvec::smallvec![&def.key, &def.value],
            TypeDef::Struct(def) => def.fields.iter().map(|f| &f.ty).collect(),
            TypeDef::Union(def) => def.members.iter().collect(),
            TypeDef::Bool
            | TypeDef::Int
            | TypeDef::Float
            | TypeDef::String
            | TypeDef::Bytes
            | TypeDef::Link
            | TypeDef::Enum(_) => SmallVec::new(),
        }
    }

    /// Struct body, if this is a struct.
    pub fn as_struct(&self) -> Option<&StructDef> {
        match &self.def {
            TypeDef::Struct(def) => Some(def),
            _ => None,
        }
    }
}

impl StructDef {
    /// Index and definition of a field by name.
    pub fn field(&self, name: &str) -> Option<(usize, &FieldDef)> {
        self.fields.iter().enumerate().find(|(_, f)| f.name == name)
    }
}

impl EnumDef {
    /// Index of a member by name.
    pub fn member(&self, name: &str) -> Option<usize> {
        self.members.iter().position(|m| m == name)
    }
}
