//! Owned, schema-free data tree.
//!
//! `Datum` is what codecs produce and consume. It is read through
//! `Node::Basic` and built from any node with `Datum::from_node`.

use weft_types::Kind;

use crate::{AccessError, Link, Node};

#[derive(Clone, Debug, PartialEq)]
pub enum Datum {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    Link(Link),
    List(Vec<Datum>),
    /// Entries in order; keys are unique.
    Map(Vec<(String, Datum)>),
}

impl Datum {
    /// Build a map from `(key, value)` pairs.
    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, Datum)>) -> Self {
        Self::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn list(items: impl IntoIterator<Item = Datum>) -> Self {
        Self::List(items.into_iter().collect())
    }

    pub fn kind(&self) -> Kind {
        match self {
            Self::Null => Kind::Null,
            Self::Bool(_) => Kind::Bool,
            Self::Int(_) => Kind::Int,
            Self::Float(_) => Kind::Float,
            Self::String(_) => Kind::String,
            Self::Bytes(_) => Kind::Bytes,
            Self::Link(_) => Kind::Link,
            Self::List(_) => Kind::List,
            Self::Map(_) => Kind::Map,
        }
    }

    /// Read this tree through the node contract.
    #[inline]
    pub fn node(&self) -> Node<'_> {
        Node::Basic(self)
    }

    /// Deep-copy any node into a generic tree.
    ///
    /// Map keys are taken from each key's representation.
    pub fn from_node(node: &Node<'_>) -> Result<Self, AccessError> {
        Ok(match node.kind() {
            Kind::Null => Self::Null,
            Kind::Bool => Self::Bool(node.as_bool()?),
            Kind::Int => Self::Int(node.as_int()?),
            Kind::Float => Self::Float(node.as_float()?),
            Kind::String => Self::String(node.as_string()?.into_owned()),
            Kind::Bytes => Self::Bytes(node.as_bytes()?.to_vec()),
            Kind::Link => Self::Link(node.as_link()?.clone()),
            Kind::List => Self::List(
                node.values()?
                    .map(|item| Self::from_node(&item))
                    .collect::<Result<_, _>>()?,
            ),
            Kind::Map => Self::Map(
                node.entries()?
                    .map(|(key, value)| {
                        Ok((
                            key.representation().as_string()?.into_owned(),
                            Self::from_node(&value)?,
                        ))
                    })
                    .collect::<Result<_, AccessError>>()?,
            ),
        })
    }
}

impl From<bool> for Datum {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Datum {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Datum {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Datum {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<String> for Datum {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}
