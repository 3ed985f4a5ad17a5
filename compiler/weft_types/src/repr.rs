//! Representation strategy declarations.
//!
//! A strategy says how the typed shape of a compound type is re-expressed
//! when the value is serialized. These are plain declarations; the
//! mapping itself lives with the node runtime.

use crate::TypeName;

/// How a map's null values appear in its representation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum NullPolicy {
    /// Nulls are explicit null entries.
    #[default]
    Explicit,

    /// Null values collapse to key absence. The typed view still sees them.
    OmitNulls,
}

/// Representation of a map type.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct MapRepr {
    pub nulls: NullPolicy,
}

impl MapRepr {
    pub fn omit_nulls() -> Self {
        Self {
            nulls: NullPolicy::OmitNulls,
        }
    }
}

/// Representation of a struct type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum StructRepr {
    /// One map entry per present field, keys optionally renamed.
    Map(StructMapRepr),

    /// Fields in declaration order inside a list.
    Tuple,

    /// A list of `[key, value]` pairs, one per present field, keys
    /// optionally renamed.
    Listpairs(StructMapRepr),

    /// String fields concatenated with a separator.
    Stringjoin {
        /// The separator placed between fields.
        join: String,
    },
}

impl Default for StructRepr {
    fn default() -> Self {
        Self::Map(StructMapRepr::default())
    }
}

impl StructRepr {
    /// Map representation without renames.
    pub fn map() -> Self {
        Self::Map(StructMapRepr::default())
    }

    /// Map representation with `(field, key)` renames.
    pub fn map_with_renames<F, K>(renames: impl IntoIterator<Item = (F, K)>) -> Self
    where
        F: Into<String>,
        K: Into<String>,
    {
        let mut repr = StructMapRepr::default();
        for (field, key) in renames {
            repr = repr.with_rename(field, key);
        }
        Self::Map(repr)
    }

    pub fn tuple() -> Self {
        Self::Tuple
    }

    /// List-pairs representation with `(field, key)` renames.
    pub fn listpairs<F, K>(renames: impl IntoIterator<Item = (F, K)>) -> Self
    where
        F: Into<String>,
        K: Into<String>,
    {
        let mut repr = StructMapRepr::default();
        for (field, key) in renames {
            repr = repr.with_rename(field, key);
        }
        Self::Listpairs(repr)
    }

    /// Field renames, for the strategies that key fields by name.
    pub fn keys(&self) -> Option<&StructMapRepr> {
        match self {
            Self::Map(keys) | Self::Listpairs(keys) => Some(keys),
            Self::Tuple | Self::Stringjoin { .. } => None,
        }
    }

    pub fn stringjoin(join: impl Into<String>) -> Self {
        Self::Stringjoin { join: join.into() }
    }

    /// Short name used in diagnostics and by emitters.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Map(_) => "map",
            Self::Tuple => "tuple",
            Self::Listpairs(_) => "listpairs",
            Self::Stringjoin { .. } => "stringjoin",
        }
    }
}

/// Field renames of a struct represented by field keys.
///
/// The renames form a static bijection between field names and keys.
/// A field without a rename uses its own name as key.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct StructMapRepr {
    renames: Vec<(String, String)>,
}

impl StructMapRepr {
    #[must_use]
    pub fn with_rename(mut self, field: impl Into<String>, key: impl Into<String>) -> Self {
        self.renames.push((field.into(), key.into()));
        self
    }

    /// The `(field, key)` pairs, in declaration order.
    pub fn renames(&self) -> &[(String, String)] {
        &self.renames
    }

    /// Representation key of a field.
    pub fn key_for<'a>(&'a self, field: &'a str) -> &'a str {
        self.renames
            .iter()
            .find(|(f, _)| f == field)
            .map_or(field, |(_, k)| k.as_str())
    }

    /// Field name for a representation key.
    ///
    /// Returns `None` when `key` is the original name of a renamed field,
    /// which is not a valid key. Callers still check the field exists.
    pub fn field_for<'a>(&'a self, key: &'a str) -> Option<&'a str> {
        if let Some((field, _)) = self.renames.iter().find(|(_, k)| k == key) {
            return Some(field);
        }
        if self.renames.iter().any(|(f, _)| f == key) {
            return None;
        }
        Some(key)
    }
}

/// Representation of a union type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum UnionRepr {
    /// A single-entry map keyed by the member's discriminant.
    Keyed(Vec<(TypeName, String)>),

    /// The member's own representation; members differ by representation kind.
    Kinded,
}

impl UnionRepr {
    /// Keyed representation from `(member, discriminant)` pairs.
    pub fn keyed<M, K>(members: impl IntoIterator<Item = (M, K)>) -> Self
    where
        M: Into<TypeName>,
        K: Into<String>,
    {
        Self::Keyed(
            members
                .into_iter()
                .map(|(m, k)| (m.into(), k.into()))
                .collect(),
        )
    }

    pub fn kinded() -> Self {
        Self::Kinded
    }

    /// Discriminant of a member for keyed unions.
    pub fn discriminant_of(&self, member: &TypeName) -> Option<&str> {
        match self {
            Self::Keyed(keys) => keys.iter().find(|(m, _)| m == member).map(|(_, k)| k.as_str()),
            Self::Kinded => None,
        }
    }

    /// Member named by a discriminant for keyed unions.
    pub fn member_for(&self, key: &str) -> Option<&TypeName> {
        match self {
            Self::Keyed(keys) => keys.iter().find(|(_, k)| k == key).map(|(m, _)| m),
            Self::Kinded => None,
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Keyed(_) => "keyed",
            Self::Kinded => "kinded",
        }
    }
}

/// Representation of an enum type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EnumRepr {
    /// Members as strings; `(member, string)` renames.
    String(Vec<(String, String)>),

    /// Members as integers; every member has an entry.
    Int(Vec<(String, i64)>),
}

impl Default for EnumRepr {
    fn default() -> Self {
        Self::String(Vec::new())
    }
}

impl EnumRepr {
    pub fn string() -> Self {
        Self::String(Vec::new())
    }

    pub fn string_with_renames<M, S>(renames: impl IntoIterator<Item = (M, S)>) -> Self
    where
        M: Into<String>,
        S: Into<String>,
    {
        Self::String(
            renames
                .into_iter()
                .map(|(m, s)| (m.into(), s.into()))
                .collect(),
        )
    }

    pub fn int<M: Into<String>>(values: impl IntoIterator<Item = (M, i64)>) -> Self {
        Self::Int(values.into_iter().map(|(m, v)| (m.into(), v)).collect())
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Int(_) => "int",
        }
    }
}
