//! Representation checks run at freeze time.
//!
//! These need resolved references (a stringjoin struct must know its field
//! types are strings, a map must know its key type is string-representable),
//! so they run over the `Schema`, after the closure check.

use rustc_hash::FxHashSet;

use super::Schema;
use crate::{
    EnumDef, EnumRepr, Kind, SchemaError, StructDef, StructRepr, TypeDef, TypeId, TypeName,
    UnionDef, UnionRepr,
};

pub(super) fn validate(schema: &Schema) -> Result<(), SchemaError> {
    for (id, ty) in schema.iter() {
        match ty.def() {
            TypeDef::Map(_) => validate_map(schema, id, ty.name())?,
            TypeDef::Struct(def) => validate_struct(schema, id, ty.name(), def)?,
            TypeDef::Union(def) => validate_union(schema, id, ty.name(), def)?,
            TypeDef::Enum(def) => validate_enum(ty.name(), def)?,
            TypeDef::Bool
            | TypeDef::Int
            | TypeDef::Float
            | TypeDef::String
            | TypeDef::Bytes
            | TypeDef::Link
            | TypeDef::List(_) => {}
        }
    }
    Ok(())
}

fn validate_map(schema: &Schema, id: TypeId, name: &TypeName) -> Result<(), SchemaError> {
    let Some((key, _)) = schema.map_entry(id) else {
        return Err(SchemaError::invalid(name, "map references do not resolve"));
    };
    let key_ty = schema.get(key);
    if key_ty.representation_kind() != Some(Kind::String) {
        return Err(SchemaError::invalid(
            name,
            format!("map key type `{}` is not string-representable", key_ty.name()),
        ));
    }
    Ok(())
}

fn validate_struct(
    schema: &Schema,
    id: TypeId,
    name: &TypeName,
    def: &StructDef,
) -> Result<(), SchemaError> {
    let mut seen = FxHashSet::default();
    for field in &def.fields {
        if !seen.insert(field.name.as_str()) {
            return Err(SchemaError::invalid(
                name,
                format!("field `{}` declared twice", field.name),
            ));
        }
    }

    match &def.repr {
        StructRepr::Map(repr) | StructRepr::Listpairs(repr) => {
            for (field, _) in repr.renames() {
                if def.field(field).is_none() {
                    return Err(SchemaError::invalid(
                        name,
                        format!("rename of undeclared field `{field}`"),
                    ));
                }
            }
            let mut keys = FxHashSet::default();
            for field in &def.fields {
                let key = repr.key_for(&field.name);
                if !keys.insert(key) {
                    return Err(SchemaError::invalid(
                        name,
                        format!("representation key `{key}` used by more than one field"),
                    ));
                }
            }
        }
        StructRepr::Tuple => {
            if let Some(field) = def.fields.iter().find(|f| f.is_optional()) {
                return Err(SchemaError::invalid(
                    name,
                    format!("tuple representation cannot hold optional field `{}`", field.name),
                ));
            }
        }
        StructRepr::Stringjoin { join } => {
            if join.is_empty() {
                return Err(SchemaError::invalid(name, "stringjoin separator is empty"));
            }
            if def.fields.is_empty() {
                return Err(SchemaError::invalid(name, "stringjoin struct has no fields"));
            }
            for (field, &field_ty) in def.fields.iter().zip(schema.refs(id)) {
                if field.is_maybe() {
                    return Err(SchemaError::invalid(
                        name,
                        format!("stringjoin field `{}` must be required and non-nullable", field.name),
                    ));
                }
                if !matches!(schema.get(field_ty).def(), TypeDef::String) {
                    return Err(SchemaError::invalid(
                        name,
                        format!("stringjoin field `{}` must be a string", field.name),
                    ));
                }
            }
        }
    }
    Ok(())
}

fn validate_union(
    schema: &Schema,
    id: TypeId,
    name: &TypeName,
    def: &UnionDef,
) -> Result<(), SchemaError> {
    if def.members.is_empty() {
        return Err(SchemaError::invalid(name, "union has no members"));
    }
    let mut members = FxHashSet::default();
    for member in &def.members {
        if !members.insert(member) {
            return Err(SchemaError::invalid(
                name,
                format!("member `{member}` listed twice"),
            ));
        }
    }

    match &def.repr {
        UnionRepr::Keyed(keys) => {
            let mut discriminants = FxHashSet::default();
            let mut keyed = FxHashSet::default();
            for (member, key) in keys {
                if !members.contains(member) {
                    return Err(SchemaError::invalid(
                        name,
                        format!("discriminant for non-member `{member}`"),
                    ));
                }
                if !keyed.insert(member) {
                    return Err(SchemaError::invalid(
                        name,
                        format!("member `{member}` has two discriminants"),
                    ));
                }
                if !discriminants.insert(key.as_str()) {
                    return Err(SchemaError::invalid(
                        name,
                        format!("discriminant `{key}` used twice"),
                    ));
                }
            }
            if keys.len() != def.members.len() {
                return Err(SchemaError::invalid(
                    name,
                    "every member needs exactly one discriminant",
                ));
            }
        }
        UnionRepr::Kinded => {
            let mut kinds = FxHashSet::default();
            for &member in schema.refs(id) {
                let member_ty = schema.get(member);
                let Some(kind) = member_ty.representation_kind() else {
                    return Err(SchemaError::invalid(
                        name,
                        format!("member `{}` has no fixed representation kind", member_ty.name()),
                    ));
                };
                if !kinds.insert(kind) {
                    return Err(SchemaError::invalid(
                        name,
                        format!("more than one member represents as {kind}"),
                    ));
                }
            }
        }
    }
    Ok(())
}

fn validate_enum(name: &TypeName, def: &EnumDef) -> Result<(), SchemaError> {
    let mut members = FxHashSet::default();
    for member in &def.members {
        if !members.insert(member.as_str()) {
            return Err(SchemaError::invalid(
                name,
                format!("enum member `{member}` listed twice"),
            ));
        }
    }

    match &def.repr {
        EnumRepr::String(renames) => {
            for (member, _) in renames {
                if !members.contains(member.as_str()) {
                    return Err(SchemaError::invalid(
                        name,
                        format!("rename of undeclared member `{member}`"),
                    ));
                }
            }
            let mut strings = FxHashSet::default();
            for member in &def.members {
                let repr = renames
                    .iter()
                    .find(|(m, _)| m == member)
                    .map_or(member.as_str(), |(_, s)| s.as_str());
                if !strings.insert(repr) {
                    return Err(SchemaError::invalid(
                        name,
                        format!("enum string `{repr}` used twice"),
                    ));
                }
            }
        }
        EnumRepr::Int(values) => {
            let mut ints = FxHashSet::default();
            let mut valued = FxHashSet::default();
            for (member, value) in values {
                if !members.contains(member.as_str()) {
                    return Err(SchemaError::invalid(
                        name,
                        format!("value for undeclared member `{member}`"),
                    ));
                }
                if !valued.insert(member.as_str()) {
                    return Err(SchemaError::invalid(
                        name,
                        format!("member `{member}` has two int values"),
                    ));
                }
                if !ints.insert(*value) {
                    return Err(SchemaError::invalid(
                        name,
                        format!("enum int {value} used twice"),
                    ));
                }
            }
            if values.len() != def.members.len() {
                return Err(SchemaError::invalid(
                    name,
                    "every member needs exactly one int value",
                ));
            }
        }
    }
    Ok(())
}
