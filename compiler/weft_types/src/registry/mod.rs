//! Type registry.
//!
//! A `TypeSystem` accumulates declarations once, then `finalize()` freezes
//! it into a `Schema`: the closure-checked, representation-validated,
//! read-only form the rest of the workspace queries.
//!
//! # Design
//!
//! - Storage in accumulation order, indexed by `TypeId`
//! - `FxHashMap` name index for O(1) resolution
//! - References are checked at `finalize()`, not at `accumulate()`, so
//!   declarations may refer forward and recursively
//! - Every reference is resolved to a `TypeId` once, at freeze time

mod validate;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::{SchemaError, Type, TypeDef, TypeId, TypeName};

/// A type system in its accumulation phase.
#[derive(Clone, Debug, Default)]
pub struct TypeSystem {
    /// Declarations in accumulation order.
    types: Vec<Type>,

    /// Name -> position in `types`.
    by_name: FxHashMap<TypeName, TypeId>,
}

/// A finalized, immutable type system.
///
/// Every reference inside every declaration is known to resolve.
#[derive(Clone, Debug)]
pub struct Schema {
    entries: Vec<SchemaEntry>,
    by_name: FxHashMap<TypeName, TypeId>,
}

#[derive(Clone, Debug)]
struct SchemaEntry {
    ty: Type,

    /// Resolved `Type::references()`, same order.
    refs: SmallVec<[TypeId; 4]>,
}

/// Names of the scalar types added by `TypeSystem::with_prelude`.
pub const PRELUDE: [&str; 6] = ["Bool", "Int", "Float", "String", "Bytes", "Link"];

impl TypeSystem {
    /// Create a new empty type system.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a type system holding the standard scalar types.
    pub fn with_prelude() -> Self {
        let mut ts = Self::new();
        ts.insert(Type::bool("Bool"));
        ts.insert(Type::int("Int"));
        ts.insert(Type::float("Float"));
        ts.insert(Type::string("String"));
        ts.insert(Type::bytes("Bytes"));
        ts.insert(Type::link("Link"));
        ts
    }

    /// Add a declaration.
    ///
    /// Fails if the name is taken. References are not checked until
    /// `finalize()`.
    pub fn accumulate(&mut self, ty: Type) -> Result<TypeId, SchemaError> {
        if self.by_name.contains_key(ty.name()) {
            return Err(SchemaError::DuplicateName {
                name: ty.name().clone(),
            });
        }
        Ok(self.insert(ty))
    }

    fn insert(&mut self, ty: Type) -> TypeId {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "a schema never holds u32::MAX declarations"
        )]
        let id = TypeId::from_raw(self.types.len() as u32);
        self.by_name.insert(ty.name().clone(), id);
        self.types.push(ty);
        id
    }

    /// Look up a declaration by name.
    pub fn resolve(&self, name: &str) -> Result<&Type, SchemaError> {
        self.by_name
            .get(name)
            .map(|id| &self.types[id.index()])
            .ok_or_else(|| SchemaError::NotFound { name: name.into() })
    }

    /// Check if a declaration with the given name exists.
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Iterate over declarations in accumulation order.
    pub fn iter(&self) -> impl Iterator<Item = &Type> {
        self.types.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Freeze the type system.
    ///
    /// Checks that every referenced name is declared (cycles are fine) and
    /// that every representation strategy is well-formed for the types it
    /// applies to.
    #[tracing::instrument(level = "debug", skip_all, fields(count = self.types.len()))]
    pub fn finalize(self) -> Result<Schema, SchemaError> {
        let mut entries = Vec::with_capacity(self.types.len());
        for ty in self.types {
            let refs = ty
                .references()
                .into_iter()
                .map(|name| {
                    self.by_name.get(name).copied().ok_or_else(|| {
                        tracing::debug!(from = %ty.name(), missing = %name, "dangling reference");
                        SchemaError::UnresolvedReference {
                            from: ty.name().clone(),
                            missing: name.clone(),
                        }
                    })
                })
                .collect::<Result<SmallVec<[TypeId; 4]>, _>>()?;
            entries.push(SchemaEntry { ty, refs });
        }

        let schema = Schema {
            entries,
            by_name: self.by_name,
        };
        validate::validate(&schema)?;

        tracing::debug!("type system finalized");
        Ok(schema)
    }
}

impl Schema {
    /// Get a declaration by id.
    ///
    /// # Panics
    /// If `id` was not issued by this schema.
    #[inline]
    pub fn get(&self, id: TypeId) -> &Type {
        &self.entries[id.index()].ty
    }

    /// Resolved references of a declaration, in `Type::references()` order.
    #[inline]
    pub fn refs(&self, id: TypeId) -> &[TypeId] {
        &self.entries[id.index()].refs
    }

    /// Look up the id of a declaration by name.
    pub fn id_of(&self, name: &str) -> Result<TypeId, SchemaError> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| SchemaError::NotFound { name: name.into() })
    }

    /// Look up a declaration by name.
    pub fn resolve(&self, name: &str) -> Result<&Type, SchemaError> {
        self.id_of(name).map(|id| self.get(id))
    }

    /// Iterate over `(id, declaration)` in accumulation order.
    pub fn iter(&self) -> impl Iterator<Item = (TypeId, &Type)> {
        self.entries.iter().enumerate().map(|(i, e)| {
            #[allow(
                clippy::cast_possible_truncation,
                reason = "ids were issued from u32 at accumulation"
            )]
            let id = TypeId::from_raw(i as u32);
            (id, &e.ty)
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Element type of a list.
    pub fn list_elem(&self, id: TypeId) -> Option<TypeId> {
        match (self.get(id).def(), self.refs(id)) {
            (TypeDef::List(_), &[elem]) => Some(elem),
            _ => None,
        }
    }

    /// Key and value types of a map.
    pub fn map_entry(&self, id: TypeId) -> Option<(TypeId, TypeId)> {
        match (self.get(id).def(), self.refs(id)) {
            (TypeDef::Map(_), &[key, value]) => Some((key, value)),
            _ => None,
        }
    }
}
