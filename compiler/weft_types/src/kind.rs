//! Data-model kinds and schema-level type kinds.
//!
//! `Kind` is the closed set of shapes any node reduces to at read time,
//! whether it is read through the typed view or the representation view.
//! `TypeKind` is the kind of a *declaration*: it distinguishes structs,
//! unions and enums, which all reduce to some `Kind` when read.

use std::fmt;

/// The shape of a node at read time.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Kind {
    Null,
    Bool,
    Int,
    Float,
    String,
    Bytes,
    Link,
    List,
    Map,
}

impl Kind {
    /// All kinds, in declaration order.
    pub const ALL: [Kind; 9] = [
        Kind::Null,
        Kind::Bool,
        Kind::Int,
        Kind::Float,
        Kind::String,
        Kind::Bytes,
        Kind::Link,
        Kind::List,
        Kind::Map,
    ];

    /// Check if this kind has children (list or map).
    #[inline]
    pub const fn is_recursive(self) -> bool {
        matches!(self, Self::List | Self::Map)
    }

    /// Check if this kind is a leaf value other than null.
    #[inline]
    pub const fn is_scalar(self) -> bool {
        matches!(
            self,
            Self::Bool | Self::Int | Self::Float | Self::String | Self::Bytes | Self::Link
        )
    }

    /// Get the lowercase name of this kind.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::String => "string",
            Self::Bytes => "bytes",
            Self::Link => "link",
            Self::List => "list",
            Self::Map => "map",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The kind of a type declaration.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub enum TypeKind {
    Bool,
    Int,
    Float,
    String,
    Bytes,
    Link,
    List,
    Map,
    Struct,
    Union,
    Enum,
}

impl TypeKind {
    /// Check if this is one of the six scalar declarations.
    #[inline]
    pub const fn is_scalar(self) -> bool {
        matches!(
            self,
            Self::Bool | Self::Int | Self::Float | Self::String | Self::Bytes | Self::Link
        )
    }

    /// The data-model kind of a scalar declaration, if this is one.
    #[inline]
    pub const fn scalar_kind(self) -> Option<Kind> {
        match self {
            Self::Bool => Some(Kind::Bool),
            Self::Int => Some(Kind::Int),
            Self::Float => Some(Kind::Float),
            Self::String => Some(Kind::String),
            Self::Bytes => Some(Kind::Bytes),
            Self::Link => Some(Kind::Link),
            Self::List | Self::Map | Self::Struct | Self::Union | Self::Enum => None,
        }
    }

    /// Get the lowercase name of this type kind.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::String => "string",
            Self::Bytes => "bytes",
            Self::Link => "link",
            Self::List => "list",
            Self::Map => "map",
            Self::Struct => "struct",
            Self::Union => "union",
            Self::Enum => "enum",
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
