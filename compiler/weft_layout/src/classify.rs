//! By-value recursion classifier.
//!
//! Walks the schema's by-value edges (struct fields and union members) to
//! answer whether one type reaches another without passing through a list
//! or map, which already store their contents on the heap. A struct field
//! that closes such a cycle must store its payload indirectly.

use std::cell::RefCell;

use rustc_hash::{FxHashMap, FxHashSet};
use weft_types::{Schema, TypeDef, TypeId};

/// Recursion classifier over a frozen schema.
///
/// # Interior Mutability
///
/// Uses `RefCell` for the answer cache so queries take `&self`.
pub struct CycleClassifier<'s> {
    schema: &'s Schema,

    /// Memoized `reaches(from, to)` answers.
    cache: RefCell<FxHashMap<(TypeId, TypeId), bool>>,
}

impl<'s> CycleClassifier<'s> {
    pub fn new(schema: &'s Schema) -> Self {
        Self {
            schema,
            cache: RefCell::new(FxHashMap::default()),
        }
    }

    /// Types stored by value inside `id`.
    fn by_value_children(&self, id: TypeId) -> &'s [TypeId] {
        match self.schema.get(id).def() {
            TypeDef::Struct(_) | TypeDef::Union(_) => self.schema.refs(id),
            TypeDef::Bool
            | TypeDef::Int
            | TypeDef::Float
            | TypeDef::String
            | TypeDef::Bytes
            | TypeDef::Link
            | TypeDef::List(_)
            | TypeDef::Map(_)
            | TypeDef::Enum(_) => &[],
        }
    }

    /// Check if a non-empty by-value path leads from `from` to `to`.
    pub fn reaches(&self, from: TypeId, to: TypeId) -> bool {
        if let Some(&cached) = self.cache.borrow().get(&(from, to)) {
            return cached;
        }

        let mut visited = FxHashSet::default();
        let mut stack: Vec<TypeId> = self.by_value_children(from).to_vec();
        let mut found = false;
        while let Some(next) = stack.pop() {
            if next == to {
                found = true;
                break;
            }
            if visited.insert(next) {
                stack.extend_from_slice(self.by_value_children(next));
            }
        }

        self.cache.borrow_mut().insert((from, to), found);
        found
    }

    /// Check if `id` contains itself by value.
    pub fn is_recursive(&self, id: TypeId) -> bool {
        self.reaches(id, id)
    }

    /// Check if a field of type `field_ty` inside `owner` closes a cycle.
    pub fn closes_cycle(&self, owner: TypeId, field_ty: TypeId) -> bool {
        field_ty == owner || self.reaches(field_ty, owner)
    }
}
